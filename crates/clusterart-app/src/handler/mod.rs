//! Handler module - TEA update function and event handlers
//!
//! Organized into submodules:
//! - `update`: Main update() function, view and live-refresh messages
//! - `time_travel`: Historical navigation, playback and snapshot loading

pub(crate) mod time_travel;
pub(crate) mod update;

#[cfg(test)]
mod tests;

use clusterart_core::TimeWindow;

use crate::message::Message;

// Re-export main entry point
pub use update::update;

/// What to do once a timepoint index arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimepointsFollowUp {
    /// Only replace the index
    None,
    /// Enter historical mode at the first timepoint
    EnterFirst,
    /// Enter historical mode at the timepoint nearest this timestamp
    EnterNearest(i64),
}

/// Actions that the event loop should perform after update
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateAction {
    /// Fetch the live snapshot
    FetchLive,

    /// Fetch the snapshot at `timestamp`, then preload `prefetch` in the
    /// background. The result is tagged with `token`.
    LoadSnapshot {
        timestamp: i64,
        token: u64,
        prefetch: Vec<i64>,
    },

    /// Preload snapshots into the cache; failures are swallowed
    Prefetch { timestamps: Vec<i64> },

    /// Fetch the timepoint index for `window`
    FetchTimepoints {
        window: TimeWindow,
        follow_up: TimepointsFollowUp,
    },

    /// Spawn the playback ticker
    StartPlayback,

    /// Cancel the playback ticker
    StopPlayback,

    /// Back to live: cancel the ticker, refetch the timepoint index for
    /// `window` and fetch the live snapshot
    ResumeLive { window: TimeWindow },
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Optional action for the event loop to perform
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: None,
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
        }
    }

    /// Attach a follow-up message to this result.
    pub fn then(mut self, msg: Message) -> Self {
        self.message = Some(msg);
        self
    }
}
