//! Hidden-state sampling: the latent character of one call.
//!
//! Draw order (fixed, part of the replay contract):
//!   1. persona
//!   2. issue
//!   3. agent_skill
//!   4. initial_frustration

use crate::{
    config::BaselineTables,
    rng::CallRng,
    types::{IssueCategory, Persona},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiddenState {
    pub persona:                Persona,
    pub issue:                  IssueCategory,
    pub agent_skill:            f64,
    pub initial_frustration:    f64,
    pub resolution_probability: f64,
    pub churn_risk_base:        f64,
}

pub struct HiddenStateSampler {
    tables: BaselineTables,
}

impl HiddenStateSampler {
    pub fn new(tables: BaselineTables) -> Self {
        Self { tables }
    }

    pub fn sample(&self, rng: &mut CallRng) -> HiddenState {
        let persona = *rng.pick(&Persona::ALL);
        let issue = *rng.pick(&IssueCategory::ALL);
        let agent_skill = rng.uniform(self.tables.agent_skill_min, self.tables.agent_skill_max);
        let initial_frustration = rng.next_f64();
        self.derive(persona, issue, agent_skill, initial_frustration)
    }

    /// Fill in the derived probabilities for fixed latent draws.
    /// Used by `sample` and by scenario replays.
    pub fn derive(
        &self,
        persona: Persona,
        issue: IssueCategory,
        agent_skill: f64,
        initial_frustration: f64,
    ) -> HiddenState {
        let t = &self.tables;
        let persona_factor =
            1.0 - t.persona_frustration.get(persona) * t.frustration_resolution_drag;
        let resolution_probability =
            (t.issue_resolution.get(issue) * agent_skill * persona_factor).min(1.0);
        let churn_risk_base =
            (t.persona_churn.get(persona) + t.frustration_churn_weight * initial_frustration)
                .min(1.0);

        HiddenState {
            persona,
            issue,
            agent_skill,
            initial_frustration,
            resolution_probability,
            churn_risk_base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngBank;
    use std::collections::HashSet;

    fn sampler() -> HiddenStateSampler {
        HiddenStateSampler::new(BaselineTables::default())
    }

    #[test]
    fn derived_fields_follow_baseline_tables() {
        let h = sampler().derive(Persona::Angry, IssueCategory::Billing, 0.5, 0.5);
        // 0.6 · 0.5 · (1 − 0.3·0.7)
        assert!((h.resolution_probability - 0.237).abs() < 1e-12);
        // min(1, 0.8 + 0.4·0.5)
        assert!((h.churn_risk_base - 1.0).abs() < 1e-12);
    }

    #[test]
    fn churn_base_is_capped_at_one() {
        let h = sampler().derive(Persona::ChurnRisk, IssueCategory::Device, 0.9, 1.0);
        assert_eq!(h.churn_risk_base, 1.0);
    }

    #[test]
    fn draws_stay_within_bounds_and_cover_enumerations() {
        let bank = RngBank::new(99);
        let s = sampler();
        let mut personas = HashSet::new();
        let mut issues = HashSet::new();
        for i in 0..2_000 {
            let h = s.sample(&mut bank.for_call(i));
            assert!((0.1..1.0).contains(&h.agent_skill));
            assert!((0.0..1.0).contains(&h.initial_frustration));
            assert!((0.0..=1.0).contains(&h.resolution_probability));
            assert!((0.0..=1.0).contains(&h.churn_risk_base));
            personas.insert(h.persona);
            issues.insert(h.issue);
        }
        assert_eq!(personas.len(), Persona::ALL.len());
        assert_eq!(issues.len(), IssueCategory::ALL.len());
    }
}
