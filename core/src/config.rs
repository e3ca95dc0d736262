use crate::types::{IssueCategory, Persona};
use serde::{Deserialize, Serialize};

// ── Baseline lookup tables ─────────────────────────────────────────

/// One value per persona. Exhaustive by construction, so lookups cannot miss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersonaTable {
    pub angry:      f64,
    pub loyal:      f64,
    pub elderly:    f64,
    pub business:   f64,
    pub tech_savvy: f64,
    pub churn_risk: f64,
}

impl PersonaTable {
    pub fn get(&self, persona: Persona) -> f64 {
        match persona {
            Persona::Angry     => self.angry,
            Persona::Loyal     => self.loyal,
            Persona::Elderly   => self.elderly,
            Persona::Business  => self.business,
            Persona::TechSavvy => self.tech_savvy,
            Persona::ChurnRisk => self.churn_risk,
        }
    }

    fn values(&self) -> [f64; 6] {
        Persona::ALL.map(|p| self.get(p))
    }
}

/// One value per issue category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IssueTable {
    pub billing:      f64,
    pub internet:     f64,
    pub device:       f64,
    pub cancellation: f64,
    pub upgrade:      f64,
}

impl IssueTable {
    pub fn get(&self, issue: IssueCategory) -> f64 {
        match issue {
            IssueCategory::Billing      => self.billing,
            IssueCategory::Internet     => self.internet,
            IssueCategory::Device       => self.device,
            IssueCategory::Cancellation => self.cancellation,
            IssueCategory::Upgrade      => self.upgrade,
        }
    }

    fn values(&self) -> [f64; 5] {
        IssueCategory::ALL.map(|i| self.get(i))
    }
}

/// Static per-persona and per-issue baselines. Loaded once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineTables {
    pub persona_frustration: PersonaTable,
    pub issue_resolution:    IssueTable,
    pub persona_churn:       PersonaTable,
    /// Weight of the persona frustration baseline in resolution probability.
    pub frustration_resolution_drag: f64,
    /// Weight of initial frustration in churn_risk_base.
    pub frustration_churn_weight:    f64,
    pub agent_skill_min: f64,
    pub agent_skill_max: f64,
}

impl Default for BaselineTables {
    fn default() -> Self {
        Self {
            persona_frustration: PersonaTable {
                angry: 0.7, loyal: 0.2, elderly: 0.4,
                business: 0.5, tech_savvy: 0.3, churn_risk: 0.8,
            },
            issue_resolution: IssueTable {
                billing: 0.6, internet: 0.5, device: 0.7,
                cancellation: 0.2, upgrade: 0.9,
            },
            persona_churn: PersonaTable {
                angry: 0.8, loyal: 0.1, elderly: 0.3,
                business: 0.6, tech_savvy: 0.2, churn_risk: 0.9,
            },
            frustration_resolution_drag: 0.3,
            frustration_churn_weight:    0.4,
            agent_skill_min: 0.1,
            agent_skill_max: 1.0,
        }
    }
}

// ── Conversation dynamics ──────────────────────────────────────────

/// Behaviour of one agent skill tier for a single turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierDynamics {
    /// Progress is only possible while resolution_progress is below this.
    pub progress_ceiling:  f64,
    /// Chance an eligible turn actually makes progress.
    pub progress_chance:   f64,
    pub progress_gain:     f64,
    /// Frustration removed on a progress turn.
    pub frustration_relief: f64,
    /// Frustration added on a stall turn.
    pub stall_penalty:     f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationConfig {
    pub min_turns: u64,
    pub max_turns: u64,
    /// Frustration added every turn for elapsed time.
    pub frustration_per_turn: f64,
    /// agent_skill strictly above this is the high tier.
    pub high_skill_threshold:   f64,
    /// agent_skill strictly above this (and not high) is the medium tier.
    pub medium_skill_threshold: f64,
    pub high:   TierDynamics,
    pub medium: TierDynamics,
    pub low:    TierDynamics,
    /// Customer tone bands: above distressed, above impatient, else calm.
    pub distressed_threshold: f64,
    pub impatient_threshold:  f64,
    pub escalation_frustration: f64,
    pub escalation_chance:      f64,
    pub resolution_threshold:   f64,
    pub abandonment_frustration: f64,
    pub abandonment_chance:      f64,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            min_turns: 3,
            max_turns: 12,
            frustration_per_turn: 0.08,
            high_skill_threshold:   0.7,
            medium_skill_threshold: 0.4,
            high: TierDynamics {
                progress_ceiling: 0.8, progress_chance: 1.0, progress_gain: 0.15,
                frustration_relief: 0.12, stall_penalty: 0.0,
            },
            medium: TierDynamics {
                progress_ceiling: 0.6, progress_chance: 0.7, progress_gain: 0.10,
                frustration_relief: 0.08, stall_penalty: 0.05,
            },
            low: TierDynamics {
                progress_ceiling: 0.0, progress_chance: 0.0, progress_gain: 0.0,
                frustration_relief: 0.0, stall_penalty: 0.15,
            },
            distressed_threshold: 0.8,
            impatient_threshold:  0.5,
            escalation_frustration: 0.85,
            escalation_chance:      0.4,
            resolution_threshold:   0.8,
            abandonment_frustration: 0.95,
            abandonment_chance:      0.3,
        }
    }
}

// ── Derived metrics ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub seconds_per_utterance_min: u64,
    pub seconds_per_utterance_max: u64,
    pub complex_issue_multiplier: f64,
    /// Calls handled by agents below this skill run longer.
    pub slow_agent_skill:       f64,
    pub slow_agent_multiplier:  f64,
    pub min_duration_sec: u32,
    pub max_duration_sec: u32,
    pub csat_base:                 f64,
    pub csat_resolved_delta:       f64,
    pub csat_unresolved_delta:     f64,
    pub csat_progress_threshold:   f64,
    pub csat_progress_bonus:       f64,
    pub csat_escalation_penalty:   f64,
    pub csat_frustration_threshold: f64,
    pub csat_frustration_penalty:  f64,
    pub csat_long_call_utterances: usize,
    pub csat_long_call_penalty:    f64,
    pub churn_resolved_factor:  f64,
    pub churn_loyal_factor:     f64,
    /// CSAT strictly below this adds `churn_low_csat_bump`.
    pub churn_low_csat:         u8,
    pub churn_low_csat_bump:    f64,
    pub churn_escalation_bump:  f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            seconds_per_utterance_min: 25,
            seconds_per_utterance_max: 45,
            complex_issue_multiplier: 1.3,
            slow_agent_skill:      0.5,
            slow_agent_multiplier: 1.2,
            min_duration_sec: 60,
            max_duration_sec: 1200,
            csat_base:                 3.0,
            csat_resolved_delta:       1.0,
            csat_unresolved_delta:    -1.0,
            csat_progress_threshold:   0.5,
            csat_progress_bonus:       0.5,
            csat_escalation_penalty:   0.5,
            csat_frustration_threshold: 0.7,
            csat_frustration_penalty:  0.5,
            csat_long_call_utterances: 8,
            csat_long_call_penalty:    0.3,
            churn_resolved_factor: 0.6,
            churn_loyal_factor:    0.3,
            churn_low_csat:        3,
            churn_low_csat_bump:   0.2,
            churn_escalation_bump: 0.15,
        }
    }
}

// ── Batch / persistence ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    pub chunk_size: usize,
    /// Retries after the first failed attempt on a transient write error.
    pub max_write_retries: u32,
    pub retry_backoff_ms:  u64,
    /// Timestamps are drawn uniformly from this many days before the anchor.
    pub lookback_days: i64,
    pub data_quality_score: f64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: 250,
            max_write_retries: 2,
            retry_backoff_ms:  25,
            lookback_days: 90,
            data_quality_score: 1.0,
        }
    }
}

// ── Top level ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub baselines:    BaselineTables,
    pub conversation: ConversationConfig,
    pub metrics:      MetricsConfig,
    pub batch:        BatchConfig,
}

impl SimConfig {
    /// Load from the data/ directory.
    /// In tests, use SimConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/simulation.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        log::info!("config: loaded {path}");
        Ok(config)
    }

    /// Config with hardcoded defaults for use in unit tests.
    /// Identical dynamics to the shipped data file, no retry back-off.
    pub fn default_test() -> Self {
        let mut config = Self::default();
        config.batch.retry_backoff_ms = 0;
        config.batch.chunk_size = 64;
        config
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let b = &self.baselines;
        let probabilities = b.persona_frustration.values().into_iter()
            .chain(b.persona_churn.values())
            .chain(b.issue_resolution.values());
        for p in probabilities {
            anyhow::ensure!((0.0..=1.0).contains(&p), "baseline {p} outside [0, 1]");
        }
        anyhow::ensure!(
            0.0 <= b.agent_skill_min && b.agent_skill_min < b.agent_skill_max && b.agent_skill_max <= 1.0,
            "agent skill bounds {}..{} are not an ordered range inside [0, 1]",
            b.agent_skill_min, b.agent_skill_max,
        );

        let c = &self.conversation;
        anyhow::ensure!(
            c.min_turns >= 1 && c.min_turns <= c.max_turns,
            "turn bounds {}..={} are invalid", c.min_turns, c.max_turns,
        );
        anyhow::ensure!(
            c.medium_skill_threshold <= c.high_skill_threshold,
            "medium skill threshold must not exceed high skill threshold",
        );
        for chance in [
            c.high.progress_chance, c.medium.progress_chance, c.low.progress_chance,
            c.escalation_chance, c.abandonment_chance,
        ] {
            anyhow::ensure!((0.0..=1.0).contains(&chance), "chance {chance} outside [0, 1]");
        }
        for tier in [&c.high, &c.medium, &c.low] {
            anyhow::ensure!(tier.progress_gain >= 0.0, "progress gain must be non-negative");
        }

        let m = &self.metrics;
        anyhow::ensure!(
            m.seconds_per_utterance_min <= m.seconds_per_utterance_max,
            "seconds-per-utterance bounds are inverted",
        );
        anyhow::ensure!(
            m.min_duration_sec <= m.max_duration_sec,
            "duration bounds are inverted",
        );

        anyhow::ensure!(self.batch.chunk_size > 0, "chunk_size must be > 0");
        anyhow::ensure!(self.batch.lookback_days > 0, "lookback_days must be > 0");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        SimConfig::default().validate().unwrap();
        SimConfig::default_test().validate().unwrap();
    }

    #[test]
    fn inverted_turn_bounds_are_rejected() {
        let mut config = SimConfig::default_test();
        config.conversation.min_turns = 9;
        config.conversation.max_turns = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_baseline_is_rejected() {
        let mut config = SimConfig::default_test();
        config.baselines.persona_churn.loyal = 1.4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let json = r#"{ "batch": { "chunk_size": 10, "max_write_retries": 1,
                        "retry_backoff_ms": 0, "lookback_days": 30,
                        "data_quality_score": 0.9 } }"#;
        let config: SimConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.batch.chunk_size, 10);
        assert_eq!(config.conversation, ConversationConfig::default());
        assert_eq!(config.baselines.persona_churn.get(Persona::ChurnRisk), 0.9);
    }

    #[test]
    fn shipped_data_file_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../data");
        let config = SimConfig::load(path).unwrap();
        assert_eq!(config.baselines, BaselineTables::default());
        assert_eq!(config.conversation, ConversationConfig::default());
        assert_eq!(config.metrics, MetricsConfig::default());
    }
}
