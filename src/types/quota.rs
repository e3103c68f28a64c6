//! Daily sell quota types and UTC day bookkeeping
//!
//! Quota counters are keyed by UTC date ("YYYY-MM-DD"). Rollover is implicit:
//! a new day simply reads as zero. Old keys are kept as history and never
//! deleted.

use chrono::{DateTime, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-player daily sell counters, keyed by UTC date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyQuotaEntry {
    pub days: BTreeMap<String, u32>,
}

impl DailyQuotaEntry {
    /// Units sold on the given day key
    pub fn sold_on(&self, day_key: &str) -> u32 {
        self.days.get(day_key).copied().unwrap_or(0)
    }

    /// Record additional units sold on the given day key
    pub fn record(&mut self, day_key: &str, units: u32) {
        let count = self.days.entry(day_key.to_string()).or_insert(0);
        *count = count.saturating_add(units);
    }
}

/// UTC day key for the given instant ("YYYY-MM-DD")
pub fn day_key_utc(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}

/// The next UTC midnight after the given instant, as an RFC 3339 string
///
/// This is when today's quota counter implicitly resets.
pub fn next_utc_midnight_iso(now: DateTime<Utc>) -> String {
    let tomorrow = now.date_naive().succ_opt().unwrap_or(now.date_naive());
    tomorrow
        .and_time(NaiveTime::MIN)
        .and_utc()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}
