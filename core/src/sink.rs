//! The persistence collaborator contract.
//!
//! RULE: The orchestrator never talks to storage directly.
//! It hands finished records to a RecordSink and reacts only to the
//! Transient / Fatal classification of each failure.

use crate::{error::SinkError, record::CallRecord, types::CallId};
use std::collections::BTreeMap;

pub trait RecordSink {
    /// Idempotent upsert keyed by `call_id`. A second write with the same
    /// id overwrites every field.
    fn upsert(&mut self, record: &CallRecord) -> Result<(), SinkError>;

    /// Upsert a chunk. One result per record, in order; a failure for one
    /// record says nothing about the others.
    fn upsert_batch(&mut self, records: &[CallRecord]) -> Vec<Result<(), SinkError>> {
        records.iter().map(|r| self.upsert(r)).collect()
    }
}

/// Keeps records in memory. Handy for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: BTreeMap<CallId, CallRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, call_id: &str) -> Option<&CallRecord> {
        self.records.get(call_id)
    }

    pub fn records(&self) -> impl Iterator<Item = &CallRecord> {
        self.records.values()
    }
}

impl RecordSink for MemorySink {
    fn upsert(&mut self, record: &CallRecord) -> Result<(), SinkError> {
        self.records.insert(record.call_id.clone(), record.clone());
        Ok(())
    }
}
