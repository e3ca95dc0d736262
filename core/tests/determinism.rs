//! THE MOST IMPORTANT TEST IN THE PROJECT.
//!
//! Two batches, same seed, same anchor.
//! They must produce byte-identical records, whatever the chunking
//! or thread count. Any divergence is a blocker.

use callsim_core::{
    clock::CallClock,
    config::SimConfig,
    orchestrator::BatchOrchestrator,
    record::CallRecord,
    sink::MemorySink,
};
use chrono::{TimeZone, Utc};

fn build(seed: u64, chunk_size: usize) -> BatchOrchestrator {
    let mut config = SimConfig::default_test();
    config.batch.chunk_size = chunk_size;
    let anchor = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();
    BatchOrchestrator::new(config, seed, CallClock::new(anchor, 90))
}

fn serialized(records: &[CallRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| serde_json::to_string(r).expect("serialize record"))
        .collect()
}

#[test]
fn same_seed_produces_identical_records() {
    const SEED: u64 = 0xDEAD_BEEF_CAFE_1234;

    let a = build(SEED, 64).generate_chunk(0, 500);
    let b = build(SEED, 64).generate_chunk(0, 500);

    let log_a = serialized(&a);
    let log_b = serialized(&b);
    assert_eq!(log_a.len(), log_b.len());
    for (i, (x, y)) in log_a.iter().zip(&log_b).enumerate() {
        assert_eq!(x, y, "record {i} diverged");
    }
}

#[test]
fn different_seeds_diverge() {
    let a = serialized(&build(1, 64).generate_chunk(0, 50));
    let b = serialized(&build(2, 64).generate_chunk(0, 50));
    assert_ne!(a, b);
}

#[test]
fn chunking_does_not_change_the_batch() {
    let mut small = MemorySink::new();
    let mut large = MemorySink::new();
    build(77, 7).run(300, &mut small);
    build(77, 300).run(300, &mut large);

    let a: Vec<_> = small.records().cloned().collect();
    let b: Vec<_> = large.records().cloned().collect();
    assert_eq!(serialized(&a), serialized(&b));
}

#[test]
fn thread_count_does_not_change_the_batch() {
    let o = build(2024, 64);
    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .expect("pool")
        .install(|| o.generate_chunk(0, 400));
    let wide = rayon::ThreadPoolBuilder::new()
        .num_threads(8)
        .build()
        .expect("pool")
        .install(|| o.generate_chunk(0, 400));
    assert_eq!(serialized(&single), serialized(&wide));
}

#[test]
fn any_call_replays_in_isolation() {
    let o = build(9, 64);
    let mut sink = MemorySink::new();
    assert!(o.run(200, &mut sink).is_success());

    for index in [0u64, 63, 64, 137, 199] {
        let solo = o.generate_call(index);
        assert_eq!(sink.get(&solo.call_id), Some(&solo), "call {index} did not replay");
    }
}
