//! Historical call clock: places each call somewhere in a trailing window.
//!
//! The anchor is fixed for a whole batch, so a replay with the same seed
//! and anchor reproduces every timestamp.

use crate::rng::CallRng;
use chrono::{DateTime, Duration, SubsecRound, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallClock {
    anchor:        DateTime<Utc>,
    lookback_secs: u64,
}

impl CallClock {
    /// Window is `[anchor − lookback_days, anchor)`, whole seconds only.
    pub fn new(anchor: DateTime<Utc>, lookback_days: i64) -> Self {
        Self {
            anchor:        anchor.trunc_subsecs(0),
            lookback_secs: (lookback_days.max(1) as u64) * 86_400,
        }
    }

    /// Anchored at the current wall-clock second. Batch jobs only;
    /// anything that must replay passes an explicit anchor.
    pub fn ending_now(lookback_days: i64) -> Self {
        Self::new(Utc::now(), lookback_days)
    }

    pub fn anchor(&self) -> DateTime<Utc> {
        self.anchor
    }

    pub fn sample(&self, rng: &mut CallRng) -> DateTime<Utc> {
        let back = rng.next_u64_below(self.lookback_secs) as i64;
        self.anchor - Duration::seconds(back)
    }
}
