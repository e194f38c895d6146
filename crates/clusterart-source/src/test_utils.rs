//! Test utilities for snapshot sources
//!
//! Provides an in-memory [`MockSource`] and helpers for building small
//! snapshots without hand-writing payload JSON.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use clusterart_core::prelude::*;
use clusterart_core::{HostDetail, SlotValues, Snapshot, TimeWindow, TimepointIndex};

use crate::source::SnapshotSource;

/// One recorded call against a [`MockSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    Live,
    At(i64),
    Timepoints(TimeWindow),
}

/// In-memory snapshot source.
///
/// Historical snapshots are keyed by timestamp; timestamps registered with
/// [`MockSource::fail_at`] return a transport error instead.
#[derive(Debug, Default)]
pub struct MockSource {
    live: Mutex<Option<Snapshot>>,
    history: Mutex<BTreeMap<i64, Snapshot>>,
    failing: Mutex<HashSet<i64>>,
    calls: Mutex<Vec<SourceCall>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_live(self, snapshot: Snapshot) -> Self {
        *lock(&self.live) = Some(snapshot);
        self
    }

    /// Register a historical snapshot at `timestamp`.
    pub fn with_snapshot(self, timestamp: i64, snapshot: Snapshot) -> Self {
        lock(&self.history).insert(timestamp, snapshot);
        self
    }

    /// Register one single-host snapshot per timestamp, the host named after it.
    pub fn with_timeline(self, timestamps: &[i64]) -> Self {
        for &ts in timestamps {
            lock(&self.history).insert(ts, test_snapshot(&format!("t{}", ts), 2, &[]));
        }
        self
    }

    pub fn fail_at(self, timestamp: i64) -> Self {
        lock(&self.failing).insert(timestamp);
        self
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<SourceCall> {
        lock(&self.calls).clone()
    }

    /// How many times `fetch_at(timestamp)` was called.
    pub fn fetch_count(&self, timestamp: i64) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| **c == SourceCall::At(timestamp))
            .count()
    }

    fn record(&self, call: SourceCall) {
        lock(&self.calls).push(call);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl SnapshotSource for MockSource {
    async fn fetch_live(&self) -> Result<Snapshot> {
        self.record(SourceCall::Live);
        lock(&self.live)
            .clone()
            .ok_or_else(|| Error::transport("mock: no live snapshot"))
    }

    async fn fetch_at(&self, timestamp: i64) -> Result<Snapshot> {
        self.record(SourceCall::At(timestamp));
        if lock(&self.failing).contains(&timestamp) {
            return Err(Error::transport(format!("mock: failure at {}", timestamp)));
        }
        lock(&self.history)
            .get(&timestamp)
            .cloned()
            .ok_or(Error::snapshot_not_found(timestamp))
    }

    async fn fetch_timepoints(&self, window: TimeWindow) -> Result<TimepointIndex> {
        self.record(SourceCall::Timepoints(window));
        let history = lock(&self.history);
        let earliest = history.keys().next().copied();
        let latest = history.keys().next_back().copied();
        let timestamps = history
            .keys()
            .copied()
            .filter(|t| window.contains(*t))
            .collect();
        Ok(TimepointIndex {
            timestamps,
            earliest,
            latest,
        })
    }
}

/// A snapshot with one host of `cpus` CPU slots, the listed ones occupied.
///
/// # Arguments
/// * `hostname` - Host name
/// * `cpus` - Number of CPU slots
/// * `occupied` - `(slot index, user)` pairs
pub fn test_snapshot(hostname: &str, cpus: u32, occupied: &[(u32, &str)]) -> Snapshot {
    Snapshot {
        host_details: vec![test_host(hostname, cpus, 0, occupied)],
        ..Default::default()
    }
}

/// A host detail with CPU and GPU slot counts; `occupied` fills CPU slots.
pub fn test_host(hostname: &str, cpus: u32, gpus: u32, occupied: &[(u32, &str)]) -> HostDetail {
    let slots: HashMap<u32, &str> = occupied.iter().copied().collect();
    let cpu_slots = (0..cpus)
        .map(|i| (i.to_string(), slots.get(&i).map(|u| u.to_string())))
        .collect();
    HostDetail {
        hostname: hostname.to_string(),
        cpu_slots: SlotValues::Sparse(cpu_slots),
        num_cpus: Some(cpus),
        num_gpus: Some(gpus),
        ..Default::default()
    }
}
