//! Bounded snapshot cache keyed by timestamp.
//!
//! Eviction is by insertion order: once full, the entry inserted longest ago
//! goes first, no matter how recently it was read. Replacing an existing key
//! keeps its original position.

use std::collections::{HashMap, VecDeque};

use clusterart_core::Snapshot;

/// Default number of snapshots kept in memory.
pub const DEFAULT_CACHE_CAPACITY: usize = 20;

#[derive(Debug, Clone)]
pub struct SnapshotCache {
    entries: HashMap<i64, Snapshot>,
    order: VecDeque<i64>,
    capacity: usize,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl SnapshotCache {
    /// Create a cache holding at most `capacity` snapshots (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Store `snapshot` under `timestamp`, evicting the oldest insertion if
    /// the cache overflows. Returns the evicted timestamp, if any.
    pub fn insert(&mut self, timestamp: i64, snapshot: Snapshot) -> Option<i64> {
        if self.entries.insert(timestamp, snapshot).is_some() {
            return None;
        }
        self.order.push_back(timestamp);
        if self.order.len() > self.capacity {
            let evicted = self.order.pop_front()?;
            self.entries.remove(&evicted);
            return Some(evicted);
        }
        None
    }

    pub fn get(&self, timestamp: i64) -> Option<&Snapshot> {
        self.entries.get(&timestamp)
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.entries.contains_key(&timestamp)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cached timestamps, oldest insertion first.
    pub fn timestamps(&self) -> impl Iterator<Item = i64> + '_ {
        self.order.iter().copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eviction_after_21_inserts() {
        let mut cache = SnapshotCache::new(20);
        for ts in 0..21 {
            cache.insert(1_000 + ts, Snapshot::default());
        }
        assert_eq!(cache.len(), 20);
        assert!(!cache.contains(1_000));
        assert!((1..21).all(|ts| cache.contains(1_000 + ts)));
    }

    #[test]
    fn test_reads_do_not_refresh_position() {
        let mut cache = SnapshotCache::new(2);
        cache.insert(1, Snapshot::default());
        cache.insert(2, Snapshot::default());
        assert!(cache.get(1).is_some());
        assert_eq!(cache.insert(3, Snapshot::default()), Some(1));
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut cache = SnapshotCache::new(2);
        cache.insert(1, Snapshot::default());
        cache.insert(2, Snapshot::default());
        assert_eq!(cache.insert(1, Snapshot::default()), None);
        assert_eq!(cache.timestamps().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(cache.insert(3, Snapshot::default()), Some(1));
    }

    #[test]
    fn test_clear() {
        let mut cache = SnapshotCache::default();
        cache.insert(1, Snapshot::default());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), DEFAULT_CACHE_CAPACITY);
    }
}
