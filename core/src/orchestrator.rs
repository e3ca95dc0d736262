//! The batch orchestrator: turns a record count into persisted call logs.
//!
//! PIPELINE PER CALL (fixed, documented, never reordered):
//!   1. HiddenStateSampler    latent persona / issue / skill / frustration
//!   2. ConversationEngine    setup draws, then the turn loop
//!   3. MetricsDeriver        duration, CSAT, churn
//!   4. Identity + timestamp  call/agent/customer ids, historical time
//!   5. Assembly              word counts, talk ratio, clean text
//!
//! RULES:
//!   - Every call owns the RNG stream for its index; nothing is shared.
//!   - Chunks are generated in parallel and persisted in index order.
//!   - A failed write never aborts the batch. Transient failures are
//!     retried at least once; fatal ones are logged and skipped.
//!   - Cancellation stops new chunks; the chunk in flight completes.

use crate::{
    clock::CallClock,
    config::SimConfig,
    conversation::{ConversationEngine, ConversationOutcome},
    error::SinkError,
    hidden_state::HiddenStateSampler,
    metrics::{MetricInputs, MetricsDeriver},
    phrase_library::PhraseLibrary,
    record::{talk_ratio, CallRecord},
    rng::{CallRng, RngBank},
    sink::RecordSink,
    types::{Speaker, TerminalState},
    utterance::UtteranceSelector,
};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A record together with the engine output that produced it.
#[derive(Debug, Clone)]
pub struct GeneratedCall {
    pub record:  CallRecord,
    pub outcome: ConversationOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedWrite {
    pub call_id:   String,
    pub transient: bool,
    pub reason:    String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeTally {
    pub resolved:  u64,
    pub escalated: u64,
    pub abandoned: u64,
    pub exhausted: u64,
    pub churned:   u64,
}

impl OutcomeTally {
    fn count(&mut self, record: &CallRecord) {
        match record.terminal_state {
            TerminalState::Resolved  => self.resolved += 1,
            TerminalState::Escalated => self.escalated += 1,
            TerminalState::Abandoned => self.abandoned += 1,
            TerminalState::Exhausted => self.exhausted += 1,
            TerminalState::Active    => {}
        }
        if record.churned {
            self.churned += 1;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub requested: u64,
    pub generated: u64,
    pub persisted: u64,
    /// Extra write attempts made after transient failures.
    pub retries:   u64,
    pub failures:  Vec<FailedWrite>,
    pub cancelled: bool,
    pub outcomes:  OutcomeTally,
}

impl BatchReport {
    /// True only when every requested record reached the sink.
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.failures.is_empty() && self.persisted == self.requested
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }
}

pub struct BatchOrchestrator {
    config:   SimConfig,
    rng_bank: RngBank,
    clock:    CallClock,
    sampler:  HiddenStateSampler,
    engine:   ConversationEngine,
    deriver:  MetricsDeriver,
    cancel:   Arc<AtomicBool>,
}

impl BatchOrchestrator {
    /// Build an orchestrator with the default phrase library.
    pub fn new(config: SimConfig, seed: u64, clock: CallClock) -> Self {
        Self::with_selector(config, seed, clock, Arc::new(PhraseLibrary))
    }

    pub fn with_selector(
        config: SimConfig,
        seed: u64,
        clock: CallClock,
        selector: Arc<dyn UtteranceSelector>,
    ) -> Self {
        Self {
            rng_bank: RngBank::new(seed),
            clock,
            sampler:  HiddenStateSampler::new(config.baselines.clone()),
            engine:   ConversationEngine::new(config.conversation.clone(), selector),
            deriver:  MetricsDeriver::new(config.metrics.clone()),
            cancel:   Arc::new(AtomicBool::new(false)),
            config,
        }
    }

    /// Set the returned flag to stop the batch before its next chunk.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn generate_call(&self, call_index: u64) -> CallRecord {
        self.generate_traced(call_index).record
    }

    /// Generate one call from its own RNG stream.
    pub fn generate_traced(&self, call_index: u64) -> GeneratedCall {
        let mut rng = self.rng_bank.for_call(call_index);

        let hidden = self.sampler.sample(&mut rng);
        let outcome = self.engine.run(&hidden, &mut rng);

        let transcript = &outcome.transcript;
        let inputs = MetricInputs {
            turns_count:         transcript.len(),
            resolved:            outcome.resolved(),
            escalated:           outcome.escalated(),
            resolution_progress: outcome.resolution_progress,
        };
        let metrics = self.deriver.derive(&hidden, &inputs, &mut rng);

        let call_id = synthetic_call_id(&mut rng);
        let agent_id = format!("AGENT_{}", rng.range_inclusive(100, 999));
        let customer_id = format!("CUST_{}", rng.range_inclusive(5000, 9999));
        let timestamp = self.clock.sample(&mut rng);

        let agent_word_count = transcript.word_count(Speaker::Agent) as u32;
        let customer_word_count = transcript.word_count(Speaker::Customer) as u32;

        log::debug!(
            "call={call_index} id={call_id} persona={} issue={} state={} turns={} csat={} churned={}",
            hidden.persona, hidden.issue, outcome.terminal_state,
            outcome.turns_taken, metrics.csat, metrics.churned,
        );

        let record = CallRecord {
            call_id,
            agent_id,
            customer_id,
            timestamp,
            customer_persona:       hidden.persona,
            issue_category:         hidden.issue,
            agent_skill:            hidden.agent_skill,
            initial_frustration:    hidden.initial_frustration,
            resolution_probability: hidden.resolution_probability,
            churn_risk_base:        hidden.churn_risk_base,
            clean_text:             transcript.clean_text(),
            transcript:             transcript.clone(),
            terminal_state:         outcome.terminal_state,
            resolved:               outcome.resolved(),
            escalated:              outcome.escalated(),
            churned:                metrics.churned,
            duration_sec:           metrics.duration_sec,
            csat:                   metrics.csat,
            agent_word_count,
            customer_word_count,
            talk_ratio:             talk_ratio(agent_word_count, customer_word_count),
            turns_count:            transcript.len() as u32,
            data_quality_score:     self.config.batch.data_quality_score,
        };

        GeneratedCall { record, outcome }
    }

    /// Generate `len` calls starting at `start`, in parallel, in index order.
    pub fn generate_chunk(&self, start: u64, len: usize) -> Vec<CallRecord> {
        (0..len)
            .into_par_iter()
            .map(|offset| self.generate_call(start + offset as u64))
            .collect()
    }

    /// Generate and persist `count` calls.
    pub fn run(&self, count: u64, sink: &mut dyn RecordSink) -> BatchReport {
        let chunk_size = self.config.batch.chunk_size.max(1) as u64;
        let mut report = BatchReport { requested: count, ..Default::default() };

        log::info!(
            "batch: generating {count} calls (seed={}, chunk={chunk_size})",
            self.rng_bank.master_seed(),
        );

        let mut next = 0u64;
        while next < count {
            if self.cancel.load(Ordering::SeqCst) {
                report.cancelled = true;
                log::warn!("batch: cancelled after {next}/{count} calls");
                break;
            }

            let len = chunk_size.min(count - next);
            let records = self.generate_chunk(next, len as usize);
            report.generated += records.len() as u64;
            for record in &records {
                report.outcomes.count(record);
            }

            self.persist_chunk(&records, sink, &mut report);
            next += len;

            log::info!(
                "batch: processed {next}/{count} (persisted={}, failed={})",
                report.persisted, report.failed_count(),
            );
        }

        log::info!(
            "batch: done, persisted {}/{} with {} retries, {} failures",
            report.persisted, report.requested, report.retries, report.failed_count(),
        );
        report
    }

    fn persist_chunk(
        &self,
        records: &[CallRecord],
        sink: &mut dyn RecordSink,
        report: &mut BatchReport,
    ) {
        let results = sink.upsert_batch(records);
        for (record, result) in records.iter().zip(results) {
            match result {
                Ok(()) => report.persisted += 1,
                Err(e) => self.retry_write(record, e, sink, report),
            }
        }
    }

    fn retry_write(
        &self,
        record: &CallRecord,
        first_error: SinkError,
        sink: &mut dyn RecordSink,
        report: &mut BatchReport,
    ) {
        let max_retries = self.config.batch.max_write_retries.max(1);
        let backoff_ms = self.config.batch.retry_backoff_ms;
        let mut error = first_error;
        let mut attempt = 0;

        while error.is_transient() && attempt < max_retries {
            attempt += 1;
            report.retries += 1;
            log::warn!("batch: {} write failed ({error}); retry {attempt}/{max_retries}", record.call_id);
            if backoff_ms > 0 {
                std::thread::sleep(std::time::Duration::from_millis(backoff_ms * attempt as u64));
            }
            match sink.upsert(record) {
                Ok(()) => {
                    report.persisted += 1;
                    return;
                }
                Err(e) => error = e,
            }
        }

        log::error!("batch: giving up on {}: {error}", record.call_id);
        report.failures.push(FailedWrite {
            call_id:   record.call_id.clone(),
            transient: error.is_transient(),
            reason:    error.to_string(),
        });
    }
}

/// `CALL_` plus twelve upper-case hex digits of a stream-derived UUID.
fn synthetic_call_id(rng: &mut CallRng) -> String {
    let uuid = uuid::Builder::from_random_bytes(rng.next_bytes16()).into_uuid();
    let hex = uuid.simple().to_string().to_uppercase();
    format!("CALL_{}", &hex[..12])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use chrono::{TimeZone, Utc};

    fn orchestrator(seed: u64) -> BatchOrchestrator {
        let anchor = Utc.with_ymd_and_hms(2026, 6, 30, 0, 0, 0).unwrap();
        BatchOrchestrator::new(SimConfig::default_test(), seed, CallClock::new(anchor, 90))
    }

    #[test]
    fn call_ids_have_the_expected_shape() {
        let record = orchestrator(1).generate_call(0);
        assert!(record.call_id.starts_with("CALL_"));
        assert_eq!(record.call_id.len(), 17);
        assert!(record.call_id[5..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        assert!(record.agent_id.starts_with("AGENT_"));
        assert!(record.customer_id.starts_with("CUST_"));
    }

    #[test]
    fn chunk_matches_one_by_one_generation() {
        let o = orchestrator(21);
        let chunk = o.generate_chunk(100, 40);
        let serial: Vec<_> = (100..140).map(|i| o.generate_call(i)).collect();
        assert_eq!(chunk, serial);
    }

    #[test]
    fn derived_counts_agree_with_transcript() {
        let o = orchestrator(5);
        for i in 0..200 {
            let r = o.generate_call(i);
            assert_eq!(r.turns_count as usize, r.transcript.len());
            assert_eq!(r.agent_word_count as usize, r.transcript.word_count(Speaker::Agent));
            assert_eq!(r.clean_text, r.transcript.clean_text());
            assert_eq!(r.resolved, r.terminal_state == TerminalState::Resolved);
            assert_eq!(r.escalated, r.terminal_state == TerminalState::Escalated);
        }
    }

    #[test]
    fn cancelled_batch_starts_no_chunk() {
        let o = orchestrator(9);
        o.cancel_handle().store(true, Ordering::SeqCst);
        let mut sink = MemorySink::new();
        let report = o.run(500, &mut sink);
        assert!(report.cancelled);
        assert_eq!(report.generated, 0);
        assert!(sink.is_empty());
        assert!(!report.is_success());
    }

    #[test]
    fn run_persists_everything_into_a_healthy_sink() {
        let o = orchestrator(13);
        let mut sink = MemorySink::new();
        let report = o.run(150, &mut sink);
        assert!(report.is_success(), "{report:?}");
        assert_eq!(report.persisted, 150);
        assert_eq!(sink.len(), 150);
        let tally = &report.outcomes;
        assert_eq!(tally.resolved + tally.escalated + tally.abandoned + tally.exhausted, 150);
    }
}
