//! Outcome metrics: duration, CSAT and churn derived from a finished call.
//!
//! Everything here is arithmetic over the final state, except two draws:
//!   1. seconds-per-utterance for duration
//!   2. the churn coin flip
//!
//! The churn probability is kept on the result as its components so the
//! drivers of a churn decision can be inspected after the fact.

use crate::{
    config::MetricsConfig,
    hidden_state::HiddenState,
    rng::CallRng,
    types::Persona,
};
use serde::{Deserialize, Serialize};

/// The slice of a finished conversation the deriver is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricInputs {
    /// Number of utterances in the transcript.
    pub turns_count:         usize,
    pub resolved:            bool,
    pub escalated:           bool,
    pub resolution_progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChurnBreakdown {
    pub base:              f64,
    pub resolved_factor:   f64,
    pub loyalty_factor:    f64,
    pub low_csat_bump:     f64,
    pub escalation_bump:   f64,
    pub probability:       f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallMetrics {
    pub duration_sec: u32,
    pub csat:         u8,
    pub churn:        ChurnBreakdown,
    pub churned:      bool,
}

pub struct MetricsDeriver {
    config: MetricsConfig,
}

impl MetricsDeriver {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    pub fn derive(
        &self,
        hidden: &HiddenState,
        inputs: &MetricInputs,
        rng: &mut CallRng,
    ) -> CallMetrics {
        let seconds_per_utterance = rng.range_inclusive(
            self.config.seconds_per_utterance_min,
            self.config.seconds_per_utterance_max,
        );
        let duration_sec = self.duration(hidden, inputs.turns_count, seconds_per_utterance);
        let csat = self.csat(hidden, inputs);
        let churn = self.churn_breakdown(hidden, inputs, csat);
        let churned = rng.chance(churn.probability);

        CallMetrics { duration_sec, csat, churn, churned }
    }

    /// Whole seconds, halves to even like CSAT, then clamped.
    pub fn duration(&self, hidden: &HiddenState, turns_count: usize, seconds_per_utterance: u64) -> u32 {
        let c = &self.config;
        let complexity = if hidden.issue.is_complex() { c.complex_issue_multiplier } else { 1.0 };
        let skill = if hidden.agent_skill < c.slow_agent_skill { c.slow_agent_multiplier } else { 1.0 };
        let raw = (turns_count as f64 * seconds_per_utterance as f64 * complexity * skill).round_ties_even();
        raw.clamp(c.min_duration_sec as f64, c.max_duration_sec as f64) as u32
    }

    /// Integer 1–5. Halves round to even.
    pub fn csat(&self, hidden: &HiddenState, inputs: &MetricInputs) -> u8 {
        let c = &self.config;
        let mut raw = c.csat_base;
        raw += if inputs.resolved { c.csat_resolved_delta } else { c.csat_unresolved_delta };
        if inputs.resolution_progress > c.csat_progress_threshold {
            raw += c.csat_progress_bonus;
        }
        if inputs.escalated {
            raw -= c.csat_escalation_penalty;
        }
        if hidden.initial_frustration > c.csat_frustration_threshold {
            raw -= c.csat_frustration_penalty;
        }
        if inputs.turns_count > c.csat_long_call_utterances {
            raw -= c.csat_long_call_penalty;
        }
        raw.round_ties_even().clamp(1.0, 5.0) as u8
    }

    pub fn churn_breakdown(
        &self,
        hidden: &HiddenState,
        inputs: &MetricInputs,
        csat: u8,
    ) -> ChurnBreakdown {
        let c = &self.config;
        let resolved_factor = if inputs.resolved { c.churn_resolved_factor } else { 1.0 };
        let loyalty_factor = if hidden.persona == Persona::Loyal { c.churn_loyal_factor } else { 1.0 };
        let low_csat_bump = if csat < c.churn_low_csat { c.churn_low_csat_bump } else { 0.0 };
        let escalation_bump = if inputs.escalated { c.churn_escalation_bump } else { 0.0 };
        let probability = hidden.churn_risk_base * resolved_factor * loyalty_factor
            + low_csat_bump
            + escalation_bump;

        ChurnBreakdown {
            base: hidden.churn_risk_base,
            resolved_factor,
            loyalty_factor,
            low_csat_bump,
            escalation_bump,
            probability,
        }
    }
}
