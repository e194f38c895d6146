//! Cluster Art Library
//!
//! Headless runner for the cluster occupancy art engine.

pub mod headless;

// Re-export main entry points
pub use headless::{run_headless, HeadlessOptions, SnapshotOrigin};
