//! Time travel: browsing historical snapshots.
//!
//! [`TimeTravelState`] is the time-travel slice of the session state. The
//! transitions (enter historical, step, play, return to live, change window)
//! live in the handler; this module holds the data they act on plus the
//! snapshot cache and playback pacing.

pub mod cache;
pub mod playback;

pub use cache::{SnapshotCache, DEFAULT_CACHE_CAPACITY};
pub use playback::{next_index, previous_index, step_interval, PlaybackClock, BASE_INTERVAL};

use chrono::{DateTime, Utc};

use clusterart_core::{TimeWindow, TimepointIndex};

use crate::config::TimeTravelSettings;

/// Time-travel slice of the session state.
///
/// `mode == false` is LIVE: the latest snapshot is shown and periodic
/// refreshes apply. `mode == true` is HISTORICAL at `timestamp`, and
/// `playing` may be set.
#[derive(Debug, Clone)]
pub struct TimeTravelState {
    pub mode: bool,
    pub timestamp: Option<i64>,
    /// Valid index into `available.timestamps` whenever that is non-empty.
    pub current_index: usize,
    pub available: TimepointIndex,
    pub window: TimeWindow,
    /// Start of the window when it is not anchored at now.
    pub window_start: Option<i64>,
    pub window_days: i64,

    pub playing: bool,
    /// Start playback as soon as the restored timestamp is loaded.
    pub play_on_load: bool,
    pub speed: u32,
    pub clock: PlaybackClock,

    pub cache: SnapshotCache,
    pub prefetch_radius: usize,

    /// Token of the most recent snapshot load; older results are stale.
    latest_token: u64,
}

impl Default for TimeTravelState {
    fn default() -> Self {
        Self::new(&TimeTravelSettings::default(), Utc::now())
    }
}

impl TimeTravelState {
    pub fn new(settings: &TimeTravelSettings, now: DateTime<Utc>) -> Self {
        Self {
            mode: false,
            timestamp: None,
            current_index: 0,
            available: TimepointIndex::default(),
            window: TimeWindow::ending_at(now, settings.window_days),
            window_start: None,
            window_days: settings.window_days,
            playing: false,
            play_on_load: false,
            speed: settings.default_speed.max(1),
            clock: PlaybackClock::default(),
            cache: SnapshotCache::new(settings.cache_capacity),
            prefetch_radius: settings.prefetch_radius,
            latest_token: 0,
        }
    }

    pub fn is_live(&self) -> bool {
        !self.mode
    }

    /// Issue a token for a new load, superseding every earlier one.
    pub fn next_token(&mut self) -> u64 {
        self.latest_token += 1;
        self.latest_token
    }

    pub fn latest_token(&self) -> u64 {
        self.latest_token
    }

    pub fn is_current_token(&self, token: u64) -> bool {
        token == self.latest_token
    }

    /// Move to `index` in the available timepoints and enter historical mode.
    ///
    /// Returns the selected timestamp, or `None` when `index` is out of range
    /// (state untouched).
    pub fn select(&mut self, index: usize) -> Option<i64> {
        let timestamp = self.available.get(index)?;
        self.mode = true;
        self.current_index = index;
        self.timestamp = Some(timestamp);
        Some(timestamp)
    }

    /// Neighbours of the current index worth preloading, nearest first.
    pub fn prefetch_candidates(&self) -> Vec<i64> {
        self.available
            .neighbours(self.current_index, self.prefetch_radius)
            .into_iter()
            .filter(|ts| !self.cache.contains(*ts))
            .collect()
    }

    /// Replace the timepoint index, keeping `current_index` valid.
    pub fn set_available(&mut self, available: TimepointIndex) {
        self.available = available;
        match self.timestamp.and_then(|ts| self.available.nearest_index(ts)) {
            Some(index) => self.current_index = index,
            None => self.current_index = 0,
        }
    }

    /// The `window_days` window starting at the explicit start, or ending now.
    pub fn window_for(&self, now: DateTime<Utc>) -> TimeWindow {
        match self.window_start {
            Some(start) => TimeWindow::starting_at(start, self.window_days),
            None => TimeWindow::ending_at(now, self.window_days),
        }
    }
}
