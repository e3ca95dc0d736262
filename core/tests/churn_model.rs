//! Population-level churn behaviour over a large batch.

use callsim_core::{
    clock::CallClock,
    config::SimConfig,
    orchestrator::BatchOrchestrator,
    record::CallRecord,
    types::Persona,
};
use chrono::{TimeZone, Utc};

/// Minimum gap between unresolved and resolved churn rates over 10,000 calls.
const RESOLUTION_CHURN_MARGIN: f64 = 0.05;

fn batch(seed: u64, n: usize) -> Vec<CallRecord> {
    let anchor = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    BatchOrchestrator::new(SimConfig::default_test(), seed, CallClock::new(anchor, 90))
        .generate_chunk(0, n)
}

fn churn_rate<'a>(records: impl Iterator<Item = &'a CallRecord>) -> (f64, usize) {
    let (churned, total) = records.fold((0usize, 0usize), |(c, t), r| (c + r.churned as usize, t + 1));
    (churned as f64 / total.max(1) as f64, total)
}

#[test]
fn resolved_calls_churn_less_than_unresolved() {
    let records = batch(1001, 10_000);
    let (resolved, n_res) = churn_rate(records.iter().filter(|r| r.resolved));
    let (unresolved, n_unres) = churn_rate(records.iter().filter(|r| !r.resolved));

    assert!(n_res > 200, "too few resolved calls: {n_res}");
    assert!(n_unres > 200, "too few unresolved calls: {n_unres}");
    assert!(
        resolved + RESOLUTION_CHURN_MARGIN < unresolved,
        "resolved churn {resolved:.3} should sit at least {RESOLUTION_CHURN_MARGIN} below unresolved {unresolved:.3}",
    );
}

#[test]
fn loyal_customers_churn_least() {
    let records = batch(1002, 10_000);
    let (loyal, _) = churn_rate(records.iter().filter(|r| r.customer_persona == Persona::Loyal));
    for persona in [Persona::Angry, Persona::ChurnRisk, Persona::Business] {
        let (rate, _) = churn_rate(records.iter().filter(|r| r.customer_persona == persona));
        assert!(loyal < rate, "loyal {loyal:.3} vs {persona} {rate:.3}");
    }
}

#[test]
fn resolution_lifts_satisfaction() {
    let records = batch(1003, 10_000);
    let mean = |resolved: bool| {
        let picked: Vec<_> = records.iter().filter(|r| r.resolved == resolved).collect();
        picked.iter().map(|r| r.csat as f64).sum::<f64>() / picked.len().max(1) as f64
    };
    assert!(mean(true) > mean(false) + 1.0);
}

#[test]
fn every_outcome_occurs_in_a_large_batch() {
    let records = batch(1004, 10_000);
    assert!(records.iter().any(|r| r.resolved));
    assert!(records.iter().any(|r| r.escalated));
    assert!(records.iter().any(|r| r.terminal_state.as_str() == "ABANDONED"));
    assert!(records.iter().any(|r| r.terminal_state.as_str() == "EXHAUSTED"));
}
