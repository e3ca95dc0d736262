//! The finished artifact of one generated call.

use crate::{
    types::{CallId, IssueCategory, Persona, TerminalState},
    utterance::Transcript,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable once assembled. Keyed by `call_id` in every store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    pub call_id:     CallId,
    pub agent_id:    String,
    pub customer_id: String,
    pub timestamp:   DateTime<Utc>,

    // Hidden state
    pub customer_persona:       Persona,
    pub issue_category:         IssueCategory,
    pub agent_skill:            f64,
    pub initial_frustration:    f64,
    pub resolution_probability: f64,
    pub churn_risk_base:        f64,

    pub transcript:     Transcript,
    pub clean_text:     String,
    pub terminal_state: TerminalState,
    pub resolved:       bool,
    pub escalated:      bool,
    pub churned:        bool,

    pub duration_sec:        u32,
    pub csat:                u8,
    pub agent_word_count:    u32,
    pub customer_word_count: u32,
    /// Agent words per customer word. May be +∞; see `talk_ratio`.
    #[serde(with = "ratio_serde")]
    pub talk_ratio:          f64,
    pub turns_count:         u32,
    pub data_quality_score:  f64,
}

/// Agent words over customer words.
///
/// Edge policy, kept exactly as the downstream consumers expect it:
/// no customer words but some agent words → +∞; no words at all → 1.0.
pub fn talk_ratio(agent_words: u32, customer_words: u32) -> f64 {
    if customer_words == 0 {
        if agent_words > 0 { f64::INFINITY } else { 1.0 }
    } else {
        agent_words as f64 / customer_words as f64
    }
}

/// JSON has no infinity; the sentinel travels as the string "inf".
mod ratio_serde {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
        if value.is_infinite() && value.is_sign_positive() {
            s.serialize_str("inf")
        } else {
            s.serialize_f64(*value)
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        match Raw::deserialize(d)? {
            Raw::Num(v) => Ok(v),
            Raw::Text(t) if t == "inf" => Ok(f64::INFINITY),
            Raw::Text(t) => Err(de::Error::custom(format!("invalid talk ratio '{t}'"))),
        }
    }
}
