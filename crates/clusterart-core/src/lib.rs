//! # clusterart-core - Core Domain Types
//!
//! Foundation crate for Cluster Art. Provides the slot model, the snapshot
//! payload and resource builder, the timepoint index, colors, error handling
//! and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, regex, tracing).
//!
//! ## Public API
//!
//! ### Resources (`resource`)
//! - [`Resource`] - One CPU or GPU slot with occupant, metadata and grid position
//! - [`SlotKind`] - `Gpu` or `Cpu`
//! - [`LoadMetrics`] - Host load averages, cpu %, memory, io
//!
//! ### Snapshots (`snapshot`)
//! - [`Snapshot`] - A full cluster-state payload; [`Snapshot::to_resources`]
//!   builds the slot list and joins job attribution
//!
//! ### Timepoints (`timepoints`)
//! - [`TimepointIndex`] - Historical timestamps available in a query window
//! - [`TimeWindow`] - A `[start, end]` window in unix seconds
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use clusterart_core::prelude::*;
//! ```

pub mod color;
pub mod error;
pub mod logging;
pub mod resource;
pub mod snapshot;
pub mod timepoints;

/// Prelude for common imports used throughout all Cluster Art crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use color::Color;
pub use error::{Error, Result, ResultExt};
pub use resource::{
    canonical_cmp, LoadMetrics, Resource, SlotKind, UNKNOWN_HARDWARE_GROUP, UNKNOWN_HOST_STATUS,
};
pub use snapshot::{
    attribute_jobs, GpuAttribution, HostDetail, JobRecord, RawJobs, RawSection, SlotValues,
    Snapshot,
};
pub use timepoints::{TimeWindow, TimepointIndex, DEFAULT_WINDOW_DAYS};
