//! Hand-built calls with known hidden state.

use callsim_core::{
    config::SimConfig,
    conversation::{CallSetup, ConversationEngine},
    hidden_state::HiddenStateSampler,
    metrics::{MetricInputs, MetricsDeriver},
    phrase_library::PhraseLibrary,
    rng::RngBank,
    types::{IssueCategory, Persona, TerminalState},
};
use std::sync::Arc;

struct Rig {
    sampler: HiddenStateSampler,
    engine:  ConversationEngine,
    deriver: MetricsDeriver,
}

fn rig() -> Rig {
    let config = SimConfig::default_test();
    Rig {
        sampler: HiddenStateSampler::new(config.baselines.clone()),
        engine:  ConversationEngine::new(config.conversation.clone(), Arc::new(PhraseLibrary)),
        deriver: MetricsDeriver::new(config.metrics.clone()),
    }
}

#[test]
fn furious_customer_with_weak_agent_ends_badly() {
    let rig = rig();
    let hidden = rig.sampler.derive(Persona::Angry, IssueCategory::Cancellation, 0.2, 0.9);
    let bank = RngBank::new(404);

    let mut bad_endings = 0;
    for i in 0..400 {
        let mut rng = bank.for_call(i);
        let out = rig.engine.run(&hidden, &mut rng);
        assert_ne!(out.terminal_state, TerminalState::Resolved);
        assert_eq!(out.resolution_progress, 0.0);

        if matches!(out.terminal_state, TerminalState::Escalated | TerminalState::Abandoned) {
            bad_endings += 1;
        }

        let inputs = MetricInputs {
            turns_count:         out.transcript.len(),
            resolved:            out.resolved(),
            escalated:           out.escalated(),
            resolution_progress: out.resolution_progress,
        };
        let metrics = rig.deriver.derive(&hidden, &inputs, &mut rng);
        assert!(metrics.csat <= 2, "csat {} for a furious caller", metrics.csat);
    }
    assert!(bad_endings >= 360, "only {bad_endings}/400 escalated or abandoned");
}

#[test]
fn calm_loyal_customer_with_strong_agent_resolves() {
    let rig = rig();
    let hidden = rig.sampler.derive(Persona::Loyal, IssueCategory::Upgrade, 0.95, 0.1);
    let setup = CallSetup { max_turns: 12, resolution_achieved: true };
    let mut rng = RngBank::new(7).for_call(0);

    let out = rig.engine.run_with_setup(&hidden, setup, &mut rng);
    assert_eq!(out.terminal_state, TerminalState::Resolved);
    // 0.15 per turn crosses 0.8 on the sixth turn
    assert_eq!(out.turns_taken, 6);
    assert!(!out.escalated());
    assert!(out.final_frustration < hidden.initial_frustration);

    let inputs = MetricInputs {
        turns_count:         out.transcript.len(),
        resolved:            true,
        escalated:           false,
        resolution_progress: out.resolution_progress,
    };
    let metrics = rig.deriver.derive(&hidden, &inputs, &mut rng);
    assert_eq!(metrics.csat, 4);
    assert!(metrics.churn.probability < 0.05);
    assert!(!metrics.churned);
}

#[test]
fn unsolvable_call_never_resolves() {
    let rig = rig();
    let hidden = rig.sampler.derive(Persona::Elderly, IssueCategory::Device, 0.9, 0.3);
    let setup = CallSetup { max_turns: 12, resolution_achieved: false };
    let bank = RngBank::new(12);
    for i in 0..100 {
        let out = rig.engine.run_with_setup(&hidden, setup, &mut bank.for_call(i));
        assert_ne!(out.terminal_state, TerminalState::Resolved);
        assert_ne!(out.terminal_state, TerminalState::Escalated);
        assert_eq!(out.resolution_progress, 0.0);
    }
}

#[test]
fn medium_agent_progress_stops_at_its_ceiling() {
    let rig = rig();
    let hidden = rig.sampler.derive(Persona::TechSavvy, IssueCategory::Internet, 0.55, 0.1);
    let setup = CallSetup { max_turns: 12, resolution_achieved: true };
    let bank = RngBank::new(55);
    for i in 0..100 {
        let out = rig.engine.run_with_setup(&hidden, setup, &mut bank.for_call(i));
        assert!(out.resolution_progress < 0.6 + 0.1 + 1e-9);
        assert_ne!(out.terminal_state, TerminalState::Resolved);
    }
}
