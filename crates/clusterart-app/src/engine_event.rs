//! Domain events emitted by the Engine for external consumers
//!
//! Events are broadcast after each message processing cycle via
//! `Engine::subscribe()`. A renderer redraws on [`EngineEvent::DataLoaded`]
//! and [`EngineEvent::ModeChanged`]; a browser shell writes
//! [`EngineEvent::UrlChanged`] into `location.hash`.

use crate::coloring::ColorMode;
use crate::layout::LayoutMode;

/// Domain events emitted by the Engine for external consumers.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    // ─────────────────────────────────────────────────────────
    // Data
    // ─────────────────────────────────────────────────────────
    /// New resources are on display
    DataLoaded {
        historical: bool,
        /// Historical timestamp, or the live snapshot's `fetchedAt`
        timestamp: Option<i64>,
        slot_count: usize,
    },

    /// A live, historical or timepoint fetch failed; nothing on display changed
    LoadFailed { message: String },

    /// The timepoint index was replaced
    TimelineUpdated { count: usize },

    // ─────────────────────────────────────────────────────────
    // View
    // ─────────────────────────────────────────────────────────
    /// Active color or layout mode changed
    ModeChanged {
        color_mode: ColorMode,
        layout_mode: LayoutMode,
    },

    /// Switched between live and historical
    TimeTravelChanged {
        historical: bool,
        timestamp: Option<i64>,
    },

    /// Playback started or stopped
    PlaybackChanged { playing: bool },

    /// The persisted URL hash changed
    UrlChanged { hash: String },

    // ─────────────────────────────────────────────────────────
    // Engine Lifecycle
    // ─────────────────────────────────────────────────────────
    /// Engine is shutting down
    Shutdown,
}

impl EngineEvent {
    /// Returns a short string label for this event type (for logging/debugging).
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::DataLoaded { .. } => "data_loaded",
            Self::LoadFailed { .. } => "load_failed",
            Self::TimelineUpdated { .. } => "timeline_updated",
            Self::ModeChanged { .. } => "mode_changed",
            Self::TimeTravelChanged { .. } => "time_travel_changed",
            Self::PlaybackChanged { .. } => "playback_changed",
            Self::UrlChanged { .. } => "url_changed",
            Self::Shutdown => "shutdown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_event_type_labels() {
        let event = EngineEvent::DataLoaded {
            historical: true,
            timestamp: Some(1_700_000_000),
            slot_count: 12,
        };
        assert_eq!(event.event_type(), "data_loaded");

        let event = EngineEvent::UrlChanged {
            hash: "x=0".to_string(),
        };
        assert_eq!(event.event_type(), "url_changed");

        assert_eq!(EngineEvent::Shutdown.event_type(), "shutdown");
    }

    #[test]
    fn test_engine_event_clone() {
        let event = EngineEvent::ModeChanged {
            color_mode: ColorMode::HostStatus,
            layout_mode: LayoutMode::Hilbert,
        };
        assert_eq!(event.clone(), event);
    }
}
