use super::CallStore;
use crate::error::SimResult;
use serde::Serialize;

/// Aggregate view over everything in `call_logs`.
/// Means and rates are 0.0 on an empty table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CallStats {
    pub total_calls:        i64,
    pub avg_agent_words:    f64,
    pub avg_customer_words: f64,
    pub avg_turns:          f64,
    pub avg_duration_sec:   f64,
    pub avg_csat:           f64,
    pub resolved_rate:      f64,
    pub escalated_rate:     f64,
    pub churn_rate:         f64,
}

impl CallStore {
    // ── Statistics ─────────────────────────────────────────────

    pub fn stats(&self) -> SimResult<CallStats> {
        let stats = self.conn.query_row(
            "SELECT COUNT(*),
                    AVG(agent_word_count),
                    AVG(customer_word_count),
                    AVG(turns_count),
                    AVG(duration_sec),
                    AVG(csat_score),
                    AVG(resolved),
                    AVG(escalated),
                    AVG(churned)
             FROM call_logs",
            [],
            |row| {
                let mean = |i: usize| -> rusqlite::Result<f64> {
                    Ok(row.get::<_, Option<f64>>(i)?.unwrap_or(0.0))
                };
                Ok(CallStats {
                    total_calls:        row.get(0)?,
                    avg_agent_words:    mean(1)?,
                    avg_customer_words: mean(2)?,
                    avg_turns:          mean(3)?,
                    avg_duration_sec:   mean(4)?,
                    avg_csat:           mean(5)?,
                    resolved_rate:      mean(6)?,
                    escalated_rate:     mean(7)?,
                    churn_rate:         mean(8)?,
                })
            },
        )?;
        Ok(stats)
    }
}
