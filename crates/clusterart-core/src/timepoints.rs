//! Historical timepoint index and query windows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default span of a timepoint query window.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Timestamps (unix seconds) with a cached snapshot inside one query window,
/// plus the overall bounds of everything the producer has cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimepointIndex {
    #[serde(default)]
    pub timestamps: Vec<i64>,
    #[serde(default)]
    pub earliest: Option<i64>,
    #[serde(default)]
    pub latest: Option<i64>,
}

impl TimepointIndex {
    /// Build an index from unordered timestamps, sorting and deduplicating.
    pub fn from_unsorted(mut timestamps: Vec<i64>, earliest: Option<i64>, latest: Option<i64>) -> Self {
        timestamps.sort_unstable();
        timestamps.dedup();
        Self {
            timestamps,
            earliest,
            latest,
        }
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<i64> {
        self.timestamps.get(index).copied()
    }

    pub fn first(&self) -> Option<i64> {
        self.timestamps.first().copied()
    }

    /// Index of the timestamp closest to `timestamp`. Ties go to the earlier one.
    pub fn nearest_index(&self, timestamp: i64) -> Option<usize> {
        if self.timestamps.is_empty() {
            return None;
        }
        let idx = self.timestamps.partition_point(|&t| t < timestamp);
        if idx == 0 {
            return Some(0);
        }
        if idx == self.timestamps.len() {
            return Some(idx - 1);
        }
        let before = timestamp - self.timestamps[idx - 1];
        let after = self.timestamps[idx] - timestamp;
        Some(if after < before { idx } else { idx - 1 })
    }

    /// Timestamps within `radius` positions of `index`, excluding `index` itself,
    /// nearest first (`i+1, i-1, i+2, i-2, …`).
    pub fn neighbours(&self, index: usize, radius: usize) -> Vec<i64> {
        let mut out = Vec::with_capacity(radius * 2);
        for step in 1..=radius {
            if let Some(ts) = index.checked_add(step).and_then(|i| self.get(i)) {
                out.push(ts);
            }
            if let Some(ts) = index.checked_sub(step).and_then(|i| self.get(i)) {
                out.push(ts);
            }
        }
        out
    }
}

/// A `[start, end]` query window in unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    /// The `days`-long window ending at `end`.
    pub fn ending_at(end: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: end.timestamp().saturating_sub(span_seconds(days)),
            end: end.timestamp(),
        }
    }

    /// The `days`-long window starting at unix `start`. Clamps instead of
    /// overflowing on out-of-range input.
    pub fn starting_at(start: i64, days: i64) -> Self {
        Self {
            start,
            end: start.saturating_add(span_seconds(days)),
        }
    }

    /// The `days`-long window with `timestamp` in its middle.
    pub fn centered_on(timestamp: i64, days: i64) -> Self {
        Self::starting_at(timestamp.saturating_sub(span_seconds(days) / 2), days)
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        (self.start..=self.end).contains(&timestamp)
    }
}

fn span_seconds(days: i64) -> i64 {
    days.saturating_mul(86_400)
}
