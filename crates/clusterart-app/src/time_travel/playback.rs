//! Playback pacing.
//!
//! Snapshots are captured every [`BASE_INTERVAL`]; at speed `n` playback
//! advances one timepoint every `BASE_INTERVAL / n` of wall-clock time.

use std::time::{Duration, Instant};

/// Capture cadence of the fetcher.
pub const BASE_INTERVAL: Duration = Duration::from_secs(120);

/// How often the ticker checks whether playback is due.
pub const TICK_PERIOD: Duration = Duration::from_millis(50);

/// Wall-clock time between advances at `speed`.
pub fn step_interval(speed: u32) -> Duration {
    BASE_INTERVAL / speed.max(1)
}

/// Index after `current` in a list of `len`, wrapping to the start.
pub fn next_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (current + 1) % len
    }
}

/// Index before `current`, wrapping to the end.
pub fn previous_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (current + len - 1) % len
    }
}

/// Tracks when playback last advanced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackClock {
    last_advance: Option<Instant>,
}

impl PlaybackClock {
    /// Forget the last advance; the next tick re-arms the clock.
    pub fn reset(&mut self) {
        self.last_advance = None;
    }

    pub fn last_advance(&self) -> Option<Instant> {
        self.last_advance
    }

    /// Returns true when an advance is due at `now`. The first tick after a
    /// reset only arms the clock.
    pub fn tick(&mut self, now: Instant, speed: u32) -> bool {
        match self.last_advance {
            None => {
                self.last_advance = Some(now);
                false
            }
            Some(last) if now.saturating_duration_since(last) >= step_interval(speed) => {
                self.last_advance = Some(now);
                true
            }
            Some(_) => false,
        }
    }
}
