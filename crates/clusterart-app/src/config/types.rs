//! Configuration types for Cluster Art
//!
//! Defines `Settings` and its sections. Every field has a default so a
//! partial (or missing) config file is always usable.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application settings (`config.toml`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub source: SourceSettings,

    #[serde(default)]
    pub refresh: RefreshSettings,

    #[serde(default)]
    pub time_travel: TimeTravelSettings,

    #[serde(default)]
    pub view: ViewSettings,
}

/// Where snapshots come from
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourceSettings {
    /// Backend base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Read the fetcher's cache folder directly instead of the backend
    #[serde(default)]
    pub cache_folder: Option<PathBuf>,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cache_folder: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Live refresh cadence
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RefreshSettings {
    /// Seconds between live refreshes; matches the fetcher's capture cadence
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    120
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TimeTravelSettings {
    /// Neighbouring timepoints preloaded on each side of the current one
    #[serde(default = "default_prefetch_radius")]
    pub prefetch_radius: usize,

    /// Snapshots kept in memory
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Initial playback speed multiplier
    #[serde(default = "default_speed")]
    pub default_speed: u32,

    /// Length of the timepoint query window
    #[serde(default = "default_window_days")]
    pub window_days: i64,
}

impl Default for TimeTravelSettings {
    fn default() -> Self {
        Self {
            prefetch_radius: default_prefetch_radius(),
            cache_capacity: default_cache_capacity(),
            default_speed: default_speed(),
            window_days: default_window_days(),
        }
    }
}

fn default_prefetch_radius() -> usize {
    3
}

fn default_cache_capacity() -> usize {
    20
}

fn default_speed() -> u32 {
    1
}

fn default_window_days() -> i64 {
    clusterart_core::DEFAULT_WINDOW_DAYS
}

/// Initial view
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ViewSettings {
    /// Color mode, 1-9
    #[serde(default = "default_mode_index")]
    pub color_mode: u8,

    /// Layout mode, 1-9
    #[serde(default = "default_mode_index")]
    pub layout_mode: u8,

    #[serde(default = "default_grid_width")]
    pub grid_width: u32,

    #[serde(default = "default_grid_height")]
    pub grid_height: u32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            color_mode: default_mode_index(),
            layout_mode: default_mode_index(),
            grid_width: default_grid_width(),
            grid_height: default_grid_height(),
        }
    }
}

fn default_mode_index() -> u8 {
    1
}

fn default_grid_width() -> u32 {
    160
}

fn default_grid_height() -> u32 {
    90
}
