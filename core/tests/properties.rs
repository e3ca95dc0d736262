//! Record-level invariants checked across a large generated sample.

use callsim_core::{
    clock::CallClock,
    config::SimConfig,
    event::progress_series,
    orchestrator::BatchOrchestrator,
    types::{Speaker, TerminalState},
};
use chrono::{Duration, TimeZone, Utc};

const CALLS: u64 = 3_000;

fn orchestrator(seed: u64) -> (BatchOrchestrator, CallClock) {
    let anchor = Utc.with_ymd_and_hms(2026, 4, 15, 8, 0, 0).unwrap();
    let clock = CallClock::new(anchor, 90);
    (BatchOrchestrator::new(SimConfig::default_test(), seed, clock), clock)
}

#[test]
fn every_record_stays_in_range() {
    let (o, clock) = orchestrator(31);
    let floor = clock.anchor() - Duration::days(90);

    for i in 0..CALLS {
        let r = o.generate_call(i);
        assert!((1..=5).contains(&r.csat), "csat {} on {}", r.csat, r.call_id);
        assert!((60..=1200).contains(&r.duration_sec), "duration {}", r.duration_sec);
        assert!(r.talk_ratio >= 0.0 && !r.talk_ratio.is_nan());
        assert!(r.timestamp <= clock.anchor() && r.timestamp > floor);
        assert!((100..=999).contains(&r.agent_id[6..].parse::<u32>().unwrap()));
        assert!((5000..=9999).contains(&r.customer_id[5..].parse::<u32>().unwrap()));
        assert_ne!(r.terminal_state, TerminalState::Active);
        assert_eq!(r.data_quality_score, 1.0);
    }
}

#[test]
fn transcript_shape_follows_the_turn_budget() {
    let (o, _) = orchestrator(32);
    for i in 0..CALLS {
        let call = o.generate_traced(i);
        let out = &call.outcome;
        let lines = call.record.transcript.utterances();

        assert!(out.turns_taken >= 1 && out.turns_taken <= out.max_turns);
        assert!((3..=12).contains(&out.max_turns));
        assert!(call.record.turns_count as u64 <= 2 * out.max_turns + 3);
        assert_eq!(lines[0].speaker, Speaker::Customer);
        assert_eq!(lines[1].speaker, Speaker::Agent);

        // opening + greeting + two lines per turn, plus a farewell on abandonment
        let farewell = u64::from(out.terminal_state == TerminalState::Abandoned);
        assert_eq!(lines.len() as u64, 2 + 2 * out.turns_taken + farewell);
    }
}

#[test]
fn progress_never_decreases_within_a_call() {
    let (o, _) = orchestrator(33);
    for i in 0..CALLS {
        let call = o.generate_traced(i);
        let series = progress_series(&call.outcome.trace);
        assert!(series.windows(2).all(|w| w[0] <= w[1]), "call {i}: {series:?}");
        assert!(series.iter().all(|p| (0.0..=1.0).contains(p)));
    }
}

#[test]
fn only_escalating_personas_escalate() {
    let (o, _) = orchestrator(34);
    for i in 0..CALLS {
        let r = o.generate_call(i);
        if r.escalated {
            assert!(r.customer_persona.can_escalate(), "{} escalated", r.customer_persona);
        }
    }
}

#[test]
fn resolution_requires_a_solvable_call() {
    let (o, _) = orchestrator(35);
    for i in 0..CALLS {
        let call = o.generate_traced(i);
        if call.record.resolved {
            assert!(call.outcome.resolution_achieved);
            assert!(call.outcome.resolution_progress > 0.8);
        }
    }
}

#[test]
fn talk_ratio_agrees_with_word_counts() {
    let (o, _) = orchestrator(36);
    for i in 0..500 {
        let r = o.generate_call(i);
        let expected = r.agent_word_count as f64 / r.customer_word_count as f64;
        assert!(r.customer_word_count > 0);
        assert_eq!(r.talk_ratio, expected);
        assert_eq!(r.turns_count as usize, r.transcript.len());
    }
}
