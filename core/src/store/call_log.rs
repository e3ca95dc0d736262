use super::CallStore;
use crate::{
    error::{SimError, SimResult, SinkError},
    record::CallRecord,
    types::{IssueCategory, Persona, TerminalState},
    utterance::Transcript,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

const UPSERT_CALL: &str = "
    INSERT INTO call_logs (
        call_id, agent_id, customer_id, timestamp, duration_sec,
        transcript_json, clean_text, csat_score, issue_category, customer_persona,
        agent_skill, initial_frustration, resolution_probability, churn_risk_base,
        terminal_state, resolved, escalated, churned,
        agent_word_count, customer_word_count, talk_ratio, turns_count,
        data_quality_score
    ) VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21,?22,?23)
    ON CONFLICT(call_id) DO UPDATE SET
        agent_id               = excluded.agent_id,
        customer_id            = excluded.customer_id,
        timestamp              = excluded.timestamp,
        duration_sec           = excluded.duration_sec,
        transcript_json        = excluded.transcript_json,
        clean_text             = excluded.clean_text,
        csat_score             = excluded.csat_score,
        issue_category         = excluded.issue_category,
        customer_persona       = excluded.customer_persona,
        agent_skill            = excluded.agent_skill,
        initial_frustration    = excluded.initial_frustration,
        resolution_probability = excluded.resolution_probability,
        churn_risk_base        = excluded.churn_risk_base,
        terminal_state         = excluded.terminal_state,
        resolved               = excluded.resolved,
        escalated              = excluded.escalated,
        churned                = excluded.churned,
        agent_word_count       = excluded.agent_word_count,
        customer_word_count    = excluded.customer_word_count,
        talk_ratio             = excluded.talk_ratio,
        turns_count            = excluded.turns_count,
        data_quality_score     = excluded.data_quality_score";

const SELECT_CALL: &str = "
    SELECT call_id, agent_id, customer_id, timestamp, duration_sec,
           transcript_json, clean_text, csat_score, issue_category, customer_persona,
           agent_skill, initial_frustration, resolution_probability, churn_risk_base,
           terminal_state, resolved, escalated, churned,
           agent_word_count, customer_word_count, talk_ratio, turns_count,
           data_quality_score
    FROM call_logs
    WHERE call_id = ?1";

fn write_call(conn: &Connection, r: &CallRecord) -> SimResult<()> {
    let transcript_json = serde_json::to_string(&r.transcript)?;
    conn.prepare_cached(UPSERT_CALL)?.execute(params![
        r.call_id,
        r.agent_id,
        r.customer_id,
        r.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        r.duration_sec,
        transcript_json,
        r.clean_text,
        r.csat,
        r.issue_category.as_str(),
        r.customer_persona.as_str(),
        r.agent_skill,
        r.initial_frustration,
        r.resolution_probability,
        r.churn_risk_base,
        r.terminal_state.as_str(),
        r.resolved,
        r.escalated,
        r.churned,
        r.agent_word_count,
        r.customer_word_count,
        r.talk_ratio,
        r.turns_count,
        r.data_quality_score,
    ])?;
    Ok(())
}

/// Column values exactly as stored, before enum and JSON decoding.
struct StoredCall {
    call_id:                String,
    agent_id:               String,
    customer_id:            String,
    timestamp:              String,
    duration_sec:           u32,
    transcript_json:        String,
    clean_text:             String,
    csat:                   u8,
    issue_category:         String,
    customer_persona:       String,
    agent_skill:            f64,
    initial_frustration:    f64,
    resolution_probability: f64,
    churn_risk_base:        f64,
    terminal_state:         String,
    resolved:               bool,
    escalated:              bool,
    churned:                bool,
    agent_word_count:       u32,
    customer_word_count:    u32,
    talk_ratio:             f64,
    turns_count:            u32,
    data_quality_score:     f64,
}

impl StoredCall {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            call_id:                row.get(0)?,
            agent_id:               row.get(1)?,
            customer_id:            row.get(2)?,
            timestamp:              row.get(3)?,
            duration_sec:           row.get(4)?,
            transcript_json:        row.get(5)?,
            clean_text:             row.get(6)?,
            csat:                   row.get(7)?,
            issue_category:         row.get(8)?,
            customer_persona:       row.get(9)?,
            agent_skill:            row.get(10)?,
            initial_frustration:    row.get(11)?,
            resolution_probability: row.get(12)?,
            churn_risk_base:        row.get(13)?,
            terminal_state:         row.get(14)?,
            resolved:               row.get(15)?,
            escalated:              row.get(16)?,
            churned:                row.get(17)?,
            agent_word_count:       row.get(18)?,
            customer_word_count:    row.get(19)?,
            talk_ratio:             row.get(20)?,
            turns_count:            row.get(21)?,
            data_quality_score:     row.get(22)?,
        })
    }

    fn into_record(self) -> SimResult<CallRecord> {
        let call_id = self.call_id;
        let invalid = |reason: String| SimError::InvalidRecord {
            call_id: call_id.clone(),
            reason,
        };

        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .map_err(|e| invalid(format!("timestamp '{}': {e}", self.timestamp)))?
            .with_timezone(&Utc);
        let transcript: Transcript = serde_json::from_str(&self.transcript_json)
            .map_err(|e| invalid(format!("transcript: {e}")))?;
        let customer_persona = self
            .customer_persona
            .parse::<Persona>()
            .map_err(|e| invalid(e.to_string()))?;
        let issue_category = self
            .issue_category
            .parse::<IssueCategory>()
            .map_err(|e| invalid(e.to_string()))?;
        let terminal_state = self
            .terminal_state
            .parse::<TerminalState>()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(CallRecord {
            call_id,
            agent_id: self.agent_id,
            customer_id: self.customer_id,
            timestamp,
            customer_persona,
            issue_category,
            agent_skill: self.agent_skill,
            initial_frustration: self.initial_frustration,
            resolution_probability: self.resolution_probability,
            churn_risk_base: self.churn_risk_base,
            transcript,
            clean_text: self.clean_text,
            terminal_state,
            resolved: self.resolved,
            escalated: self.escalated,
            churned: self.churned,
            duration_sec: self.duration_sec,
            csat: self.csat,
            agent_word_count: self.agent_word_count,
            customer_word_count: self.customer_word_count,
            talk_ratio: self.talk_ratio,
            turns_count: self.turns_count,
            data_quality_score: self.data_quality_score,
        })
    }
}

impl CallStore {
    // ── Call logs ──────────────────────────────────────────────

    /// Insert or fully replace the row keyed by `call_id`.
    pub fn upsert_call(&self, record: &CallRecord) -> SimResult<()> {
        write_call(&self.conn, record)
    }

    /// Write a chunk inside one transaction, keeping a result per record.
    pub(super) fn upsert_chunk(
        &mut self,
        records: &[CallRecord],
    ) -> rusqlite::Result<Vec<Result<(), SinkError>>> {
        let tx = self.conn.transaction()?;
        let results = records
            .iter()
            .map(|r| write_call(&tx, r).map_err(SinkError::from))
            .collect();
        tx.commit()?;
        Ok(results)
    }

    pub fn get_call(&self, call_id: &str) -> SimResult<Option<CallRecord>> {
        let stored = self
            .conn
            .query_row(SELECT_CALL, params![call_id], StoredCall::from_row)
            .optional()?;
        stored.map(StoredCall::into_record).transpose()
    }

    pub fn call_count(&self) -> SimResult<i64> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM call_logs", [], |r| r.get(0))?;
        Ok(n)
    }

    /// Call ids in timestamp order, oldest first.
    pub fn call_ids(&self) -> SimResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT call_id FROM call_logs ORDER BY timestamp, call_id")?;
        let ids = stmt
            .query_map([], |r| r.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
    }
}
