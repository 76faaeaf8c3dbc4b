//! Recent-duplicate detection over the loot log.
//!
//! A value counts as a duplicate when some log row younger than the dedup
//! window contains it in any column. Rows with unparsable timestamps are
//! ignored.

use chrono::{NaiveDateTime, TimeDelta};
use std::collections::HashSet;

use super::record::LogEntry;

/// Default dedup window in seconds.
pub const DEFAULT_WINDOW_SECS: u64 = 60;

/// Converts a window in seconds to a `TimeDelta`, saturating on overflow.
pub fn window_from_secs(secs: u64) -> TimeDelta {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}

fn is_within(entry: &LogEntry, window: TimeDelta, now: NaiveDateTime) -> bool {
    entry
        .timestamp()
        .is_some_and(|logged_at| now - logged_at < window)
}

/// Scans `entries` in order for a row inside the window containing `value`.
///
/// An empty value is never a duplicate.
pub fn is_recent_duplicate(
    value: &str,
    entries: &[LogEntry],
    window: TimeDelta,
    now: NaiveDateTime,
) -> bool {
    !value.is_empty()
        && entries
            .iter()
            .any(|entry| is_within(entry, window, now) && entry.values().contains(&value))
}

/// Values seen in the log within the dedup window, captured once per scan.
///
/// Equivalent to calling `is_recent_duplicate` per value against the same
/// log snapshot and `now`.
#[derive(Debug, Clone, Default)]
pub struct RecentObservations {
    values: HashSet<String>,
}

impl RecentObservations {
    pub fn from_entries(entries: &[LogEntry], window: TimeDelta, now: NaiveDateTime) -> Self {
        let values = entries
            .iter()
            .filter(|entry| is_within(entry, window, now))
            .flat_map(|entry| entry.values())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect();
        Self { values }
    }

    pub fn contains(&self, value: &str) -> bool {
        !value.is_empty() && self.values.contains(value)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
