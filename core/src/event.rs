//! Per-call event trace.
//!
//! RULE: The conversation engine records every state change here.
//! The trace is an observation of the run, never an input to it.

use crate::types::{SkillTier, TerminalState};
use serde::{Deserialize, Serialize};

/// Every event emitted while a call unfolds.
/// Variants are appended only; never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallEvent {
    CallStarted {
        max_turns:           u64,
        resolution_achieved: bool,
        frustration:         f64,
    },
    TurnCompleted {
        turn:                u64,
        tier:                SkillTier,
        made_progress:       bool,
        frustration:         f64,
        resolution_progress: f64,
    },
    CallTerminated {
        turn:  u64,
        state: TerminalState,
    },
}

impl CallEvent {
    /// Stable name for logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::CallStarted { .. }    => "call_started",
            Self::TurnCompleted { .. }  => "turn_completed",
            Self::CallTerminated { .. } => "call_terminated",
        }
    }
}

/// Progress values turn over turn, in order.
pub fn progress_series(trace: &[CallEvent]) -> Vec<f64> {
    trace
        .iter()
        .filter_map(|e| match e {
            CallEvent::TurnCompleted { resolution_progress, .. } => Some(*resolution_progress),
            _ => None,
        })
        .collect()
}
