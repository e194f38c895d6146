//! Message types for the application (TEA pattern)

use std::time::Instant;

use clusterart_core::{Snapshot, TimepointIndex};

use crate::handler::TimepointsFollowUp;

/// All possible messages/actions in the application
#[derive(Debug, Clone)]
pub enum Message {
    /// Periodic live refresh timer fired
    RefreshTick,

    /// Live snapshot fetched
    LiveSnapshotLoaded { snapshot: Box<Snapshot> },

    /// Live snapshot fetch failed
    LiveSnapshotFailed { error: String },

    /// Force quit
    Quit,

    // ─────────────────────────────────────────────────────────
    // View Messages
    // ─────────────────────────────────────────────────────────
    /// Select color mode by 1-based index (keys 1-9)
    SetColorMode(u8),
    /// Select layout mode by 1-based index (shift+1-9)
    SetLayoutMode(u8),
    /// Multiply zoom by a factor (wheel)
    ZoomBy { factor: f64 },
    /// Pointer pressed on the canvas
    DragStart { x: f64, y: f64 },
    /// Pointer moved
    DragMove { x: f64, y: f64 },
    /// Pointer released
    DragEnd,
    /// Viewport resized
    Resize { width: f64, height: f64 },
    /// Change the layout grid
    SetGrid { width: u32, height: u32 },
    ToggleLegend,
    ToggleHelp,
    ToggleTimeTravelPanel,

    // ─────────────────────────────────────────────────────────
    // Time Travel Messages
    // ─────────────────────────────────────────────────────────
    /// Jump to an index of the available timepoints (slider)
    EnterHistorical { index: usize },
    /// Jump to the timepoint nearest `timestamp` (scrub)
    ScrubTo { timestamp: i64 },
    /// One timepoint later, wrapping
    StepForward,
    /// One timepoint earlier, wrapping
    StepBackward,
    /// Back to the latest data
    ReturnToLive,
    /// Change the 7-day query window to start at `start`
    SetWindowStart { start: i64, enter_historical: bool },
    /// Playback speed multiplier
    SetSpeed(u32),
    StartPlayback,
    StopPlayback,
    TogglePlayback,
    /// Playback ticker fired at `now`
    PlaybackTick { now: Instant },

    /// Refetch the timepoint index for the current window
    RefreshTimepoints,
    /// Timepoint index fetched
    TimepointsLoaded {
        index: TimepointIndex,
        follow_up: TimepointsFollowUp,
    },
    /// Timepoint index fetch failed
    TimepointsFailed { error: String },

    /// Historical snapshot fetched for a load issued with `token`
    SnapshotLoaded {
        timestamp: i64,
        token: u64,
        snapshot: Box<Snapshot>,
    },
    /// Historical snapshot fetch failed
    SnapshotFailed {
        timestamp: i64,
        token: u64,
        error: String,
    },
    /// Background prefetch completed
    SnapshotPrefetched {
        timestamp: i64,
        snapshot: Box<Snapshot>,
    },

    /// Restore session state from a URL hash
    RestoreFromUrl { hash: String },
}
