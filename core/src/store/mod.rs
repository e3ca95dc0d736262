//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The orchestrator sees it through RecordSink and never executes SQL.

use crate::{
    error::{SimResult, SinkError},
    record::CallRecord,
    sink::RecordSink,
};
use rusqlite::Connection;

mod call_log;
mod stats;

pub use stats::CallStats;

pub struct CallStore {
    conn: Connection,
}

impl CallStore {
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.busy_timeout(std::time::Duration::from_millis(500))?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests and dry runs).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open(":memory:")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_call_logs.sql"))?;
        Ok(())
    }

    /// Drop every stored call and recreate the schema.
    pub fn reset(&self) -> SimResult<()> {
        self.conn.execute_batch("DROP TABLE IF EXISTS call_logs;")?;
        self.migrate()?;
        log::info!("store: call_logs reset");
        Ok(())
    }
}

impl RecordSink for CallStore {
    fn upsert(&mut self, record: &CallRecord) -> Result<(), SinkError> {
        self.upsert_call(record).map_err(SinkError::from)
    }

    /// One transaction per chunk. If the transaction itself cannot be
    /// opened or committed, every record falls back to a single write.
    fn upsert_batch(&mut self, records: &[CallRecord]) -> Vec<Result<(), SinkError>> {
        match self.upsert_chunk(records) {
            Ok(results) => results,
            Err(e) => {
                log::warn!("store: chunk transaction failed ({e}); writing records one by one");
                records.iter().map(|r| self.upsert(r)).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::CallClock, config::SimConfig, orchestrator::BatchOrchestrator,
    };
    use chrono::{TimeZone, Utc};

    fn records(n: usize) -> Vec<CallRecord> {
        let anchor = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        BatchOrchestrator::new(SimConfig::default_test(), 3, CallClock::new(anchor, 30))
            .generate_chunk(0, n)
    }

    #[test]
    fn migrate_is_repeatable() {
        let store = CallStore::in_memory().unwrap();
        store.migrate().unwrap();
        store.migrate().unwrap();
        assert_eq!(store.call_count().unwrap(), 0);
    }

    #[test]
    fn memory_stores_are_isolated() {
        let mut store = CallStore::in_memory().unwrap();
        store.migrate().unwrap();
        store.upsert(&records(1)[0]).unwrap();

        let other = CallStore::in_memory().unwrap();
        other.migrate().unwrap();
        assert_eq!(other.call_count().unwrap(), 0);
        assert_eq!(store.call_count().unwrap(), 1);
    }

    #[test]
    fn chunk_upsert_reports_one_result_per_record() {
        let mut store = CallStore::in_memory().unwrap();
        store.migrate().unwrap();
        let batch = records(25);
        let results = store.upsert_batch(&batch);
        assert_eq!(results.len(), 25);
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(store.call_count().unwrap(), 25);
        assert_eq!(store.call_ids().unwrap().len(), 25);
    }

    #[test]
    fn writing_before_migration_is_fatal() {
        let mut store = CallStore::in_memory().unwrap();
        let err = store.upsert(&records(1)[0]).unwrap_err();
        assert!(!err.is_transient(), "{err}");
    }
}
