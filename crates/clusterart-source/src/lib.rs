//! # clusterart-source - Snapshot Sources
//!
//! Fetches cluster snapshots and timepoint indices, either from the caching
//! backend over HTTP or straight from its on-disk cache folder.
//!
//! Depends on [`clusterart_core`] for the payload types and error handling.
//!
//! ## Public API
//!
//! ### Source Abstraction
//! - [`SnapshotSource`] - Live snapshot, snapshot by timestamp, timepoint index
//!
//! ### HTTP
//! - [`HttpSource`] - `api/cluster-status` and `api/timepoints` over reqwest
//!
//! ### Disk Cache
//! - [`DiskCacheSource`] - Reads `<cache>/YYYYMM/DD/<unix>.json.gz` (and flat legacy files)
//! - [`cache_path_for_timestamp()`] - UTC-bucketed cache path for a timestamp
//! - [`decode_snapshot()`] - Decode a plain or gzipped cache file body

pub mod disk;
pub mod http;
pub mod source;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

pub use disk::{
    cache_path_for_timestamp, decode_snapshot, scan_timestamps, timestamp_from_path,
    DiskCacheSource,
};
pub use http::HttpSource;
pub use source::{LocalSnapshotSource, SnapshotSource};
