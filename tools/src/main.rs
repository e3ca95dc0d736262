//! call-runner: headless batch generator for synthetic call logs.
//!
//! Usage:
//!   call-runner --count 1000 --seed 42 --db calls.db
//!   call-runner --count 500 --db calls.db --reset --json
//!   call-runner --count 100 --seed 7 --anchor 2026-01-01T00:00:00Z
//!   call-runner --db calls.db --stats

use anyhow::{Context, Result};
use callsim_core::{
    clock::CallClock,
    config::SimConfig,
    orchestrator::{BatchOrchestrator, BatchReport},
    store::{CallStats, CallStore},
};
use chrono::{DateTime, Utc};
use std::env;
use std::path::Path;

#[derive(serde::Serialize)]
struct RunSummary<'a> {
    seed:   u64,
    db:     &'a str,
    report: &'a BatchReport,
    stats:  &'a CallStats,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let count = parse_arg(&args, "--count", 1000u64);
    let seed = parse_arg(&args, "--seed", 42u64);
    let chunk_size = parse_arg(&args, "--chunk-size", 0usize);
    let reset = args.iter().any(|a| a == "--reset");
    let stats_only = args.iter().any(|a| a == "--stats");
    let json = args.iter().any(|a| a == "--json");
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");
    let anchor = args
        .windows(2)
        .find(|w| w[0] == "--anchor")
        .map(|w| w[1].as_str());

    let mut store = CallStore::open(db)?;
    store.migrate()?;
    if reset {
        store.reset()?;
    }

    if stats_only {
        print_stats(&store.stats()?);
        return Ok(());
    }

    let mut config = load_config(data_dir)?;
    if chunk_size > 0 {
        config.batch.chunk_size = chunk_size;
    }

    if !json {
        println!("call-runner");
        println!("  count:     {count}");
        println!("  seed:      {seed}");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!("  chunk:     {}", config.batch.chunk_size);
        println!();
    }

    // A fixed anchor makes the whole batch replayable.
    let clock = match anchor {
        Some(a) => {
            let at = DateTime::parse_from_rfc3339(a)
                .with_context(|| format!("--anchor '{a}' is not RFC 3339"))?;
            CallClock::new(at.with_timezone(&Utc), config.batch.lookback_days)
        }
        None => CallClock::ending_now(config.batch.lookback_days),
    };
    let orchestrator = BatchOrchestrator::new(config, seed, clock);
    let report = orchestrator.run(count, &mut store);
    let stats = store.stats()?;

    if json {
        let summary = RunSummary { seed, db, report: &report, stats: &stats };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_report(&report);
        println!();
        print_stats(&stats);
    }

    if !report.is_success() {
        log::error!(
            "only {}/{} calls persisted",
            report.persisted, report.requested,
        );
        std::process::exit(1);
    }
    Ok(())
}

/// The shipped data file when present, built-in defaults otherwise.
fn load_config(data_dir: &str) -> Result<SimConfig> {
    if Path::new(data_dir).join("simulation.json").exists() {
        SimConfig::load(data_dir)
    } else {
        log::warn!("no simulation.json under {data_dir}; using built-in defaults");
        Ok(SimConfig::default())
    }
}

fn print_report(report: &BatchReport) {
    let o = &report.outcomes;
    println!("=== BATCH SUMMARY ===");
    println!("  requested:  {}", report.requested);
    println!("  generated:  {}", report.generated);
    println!("  persisted:  {}", report.persisted);
    println!("  retries:    {}", report.retries);
    println!("  failed:     {}", report.failed_count());
    println!("  cancelled:  {}", report.cancelled);
    println!("  resolved:   {}", o.resolved);
    println!("  escalated:  {}", o.escalated);
    println!("  abandoned:  {}", o.abandoned);
    println!("  exhausted:  {}", o.exhausted);
    println!("  churned:    {}", o.churned);
    for failure in &report.failures {
        println!("  ! {} ({})", failure.call_id, failure.reason);
    }
}

fn print_stats(stats: &CallStats) {
    println!("=== STORE STATISTICS ===");
    println!("  total calls:        {}", stats.total_calls);
    println!("  avg agent words:    {:.1}", stats.avg_agent_words);
    println!("  avg customer words: {:.1}", stats.avg_customer_words);
    println!("  avg turns:          {:.1}", stats.avg_turns);
    println!("  avg duration (s):   {:.1}", stats.avg_duration_sec);
    println!("  avg csat:           {:.2}", stats.avg_csat);
    println!("  resolved rate:      {:.1}%", stats.resolved_rate * 100.0);
    println!("  escalated rate:     {:.1}%", stats.escalated_rate * 100.0);
    println!("  churn rate:         {:.1}%", stats.churn_rate * 100.0);
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
