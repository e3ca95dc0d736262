//! Shared primitive types used across the entire generator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A stable, unique identifier for a generated call.
pub type CallId = String;

/// Customer archetype. Governs frustration/churn baselines and tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Angry,
    Loyal,
    Elderly,
    Business,
    TechSavvy,
    ChurnRisk,
}

impl Persona {
    /// Declaration order. Uniform draws index into this slice,
    /// so NEVER reorder it.
    pub const ALL: [Persona; 6] = [
        Persona::Angry,
        Persona::Loyal,
        Persona::Elderly,
        Persona::Business,
        Persona::TechSavvy,
        Persona::ChurnRisk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Angry     => "angry",
            Self::Loyal     => "loyal",
            Self::Elderly   => "elderly",
            Self::Business  => "business",
            Self::TechSavvy => "tech_savvy",
            Self::ChurnRisk => "churn_risk",
        }
    }

    /// Personas that will push a call past the agent when frustrated enough.
    pub fn can_escalate(&self) -> bool {
        matches!(self, Self::Angry | Self::Business | Self::ChurnRisk)
    }
}

/// The reason for the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Billing,
    Internet,
    Device,
    Cancellation,
    Upgrade,
}

impl IssueCategory {
    /// Declaration order. NEVER reorder.
    pub const ALL: [IssueCategory; 5] = [
        IssueCategory::Billing,
        IssueCategory::Internet,
        IssueCategory::Device,
        IssueCategory::Cancellation,
        IssueCategory::Upgrade,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Billing      => "billing",
            Self::Internet     => "internet",
            Self::Device       => "device",
            Self::Cancellation => "cancellation",
            Self::Upgrade      => "upgrade",
        }
    }

    /// Issues whose calls run long regardless of skill.
    pub fn is_complex(&self) -> bool {
        matches!(self, Self::Cancellation | Self::Billing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    Agent,
    Customer,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agent    => "Agent",
            Self::Customer => "Customer",
        }
    }
}

/// Where a call is in its lifecycle. Everything except `Active` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminalState {
    Active,
    Resolved,
    Escalated,
    Abandoned,
    Exhausted,
}

impl TerminalState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active    => "ACTIVE",
            Self::Resolved  => "RESOLVED",
            Self::Escalated => "ESCALATED",
            Self::Abandoned => "ABANDONED",
            Self::Exhausted => "EXHAUSTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

/// Agent competence band derived from agent_skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillTier {
    High,
    Medium,
    Low,
}

/// Customer mood band derived from current frustration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrustrationTier {
    Distressed,
    Impatient,
    Calm,
}

// ── String round-trips (store columns) ─────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind:  &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! str_round_trip {
    ($ty:ty, $kind:literal, [$($variant:expr),+ $(,)?]) => {
        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                [$($variant),+]
                    .into_iter()
                    .find(|v| v.as_str() == s)
                    .ok_or_else(|| UnknownVariant { kind: $kind, value: s.to_string() })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_round_trip!(Persona, "persona", [
    Persona::Angry, Persona::Loyal, Persona::Elderly,
    Persona::Business, Persona::TechSavvy, Persona::ChurnRisk,
]);
str_round_trip!(IssueCategory, "issue category", [
    IssueCategory::Billing, IssueCategory::Internet, IssueCategory::Device,
    IssueCategory::Cancellation, IssueCategory::Upgrade,
]);
str_round_trip!(Speaker, "speaker", [Speaker::Agent, Speaker::Customer]);
str_round_trip!(TerminalState, "terminal state", [
    TerminalState::Active, TerminalState::Resolved, TerminalState::Escalated,
    TerminalState::Abandoned, TerminalState::Exhausted,
]);
