//! The snapshot source abstraction
//!
//! Everything the time-travel controller needs from the outside world:
//! the live snapshot, a historical snapshot by timestamp, and the index of
//! historical timestamps inside a query window.

use clusterart_core::prelude::*;
use clusterart_core::{Snapshot, TimeWindow, TimepointIndex};

/// Where snapshots come from.
///
/// Implement [`SnapshotSource`] (the `Send` variant); background tasks spawn
/// the returned futures on the tokio runtime.
#[trait_variant::make(SnapshotSource: Send)]
pub trait LocalSnapshotSource {
    /// The most recent snapshot.
    async fn fetch_live(&self) -> Result<Snapshot>;

    /// The snapshot captured at `timestamp` (unix seconds).
    async fn fetch_at(&self, timestamp: i64) -> Result<Snapshot>;

    /// Timestamps available inside `window`, plus the overall bounds.
    async fn fetch_timepoints(&self, window: TimeWindow) -> Result<TimepointIndex>;
}
