//! Main update function - handles state transitions (TEA pattern)
//!
//! Time-travel handlers live in `time_travel`.

use tracing::{debug, info, warn};

use crate::layout::GridSize;
use crate::message::Message;
use crate::state::SessionState;
use crate::url_state;

use super::{time_travel, UpdateAction, UpdateResult};

/// Process a message and update state
/// Returns optional follow-up message and/or action
pub fn update(state: &mut SessionState, message: Message) -> UpdateResult {
    match message {
        Message::Quit => {
            state.request_quit();
            UpdateResult::none()
        }

        Message::RefreshTick => {
            if state.time_travel.mode {
                debug!("Skipping live refresh in historical mode");
                return UpdateResult::none();
            }
            UpdateResult::action(UpdateAction::FetchLive)
        }

        Message::LiveSnapshotLoaded { snapshot } => {
            if state.time_travel.mode {
                debug!("Discarding live snapshot that arrived in historical mode");
                return UpdateResult::none();
            }
            state.load_snapshot(&snapshot);
            debug!("Live snapshot applied ({} slots)", state.resources.len());
            UpdateResult::none()
        }

        Message::LiveSnapshotFailed { error } => {
            warn!("Live refresh failed: {}", error);
            state.record_error(error);
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────────
        // View Messages
        // ─────────────────────────────────────────────────────────
        Message::SetColorMode(index) => {
            if state.set_color_mode(index) {
                info!("Color mode: {}", state.color_mode.name());
            } else {
                debug!("Ignoring color mode {}", index);
            }
            UpdateResult::none()
        }

        Message::SetLayoutMode(index) => {
            if state.set_layout_mode(index) {
                info!("Layout mode: {}", state.layout_mode.name());
            } else {
                debug!("Ignoring layout mode {}", index);
            }
            UpdateResult::none()
        }

        Message::ZoomBy { factor } => {
            state.canvas.zoom_by(factor);
            UpdateResult::none()
        }

        Message::DragStart { x, y } => {
            let canvas = state.canvas;
            state.drag.begin((x, y), &canvas);
            UpdateResult::none()
        }

        Message::DragMove { x, y } => {
            if let Some((cx, cy)) = state.drag.follow((x, y)) {
                state.canvas.x = cx;
                state.canvas.y = cy;
            }
            UpdateResult::none()
        }

        Message::DragEnd => {
            state.drag.end();
            UpdateResult::none()
        }

        Message::Resize { width, height } => {
            if width.is_finite() && height.is_finite() {
                state.canvas.width = width.max(0.0);
                state.canvas.height = height.max(0.0);
            }
            UpdateResult::none()
        }

        Message::SetGrid { width, height } => {
            state.grid = GridSize::new(width, height);
            UpdateResult::none()
        }

        Message::ToggleLegend => {
            state.panels.legend_expanded = !state.panels.legend_expanded;
            UpdateResult::none()
        }

        Message::ToggleHelp => {
            state.panels.help_expanded = !state.panels.help_expanded;
            UpdateResult::none()
        }

        Message::ToggleTimeTravelPanel => {
            state.panels.time_travel_expanded = !state.panels.time_travel_expanded;
            UpdateResult::none()
        }

        Message::RestoreFromUrl { hash } => {
            url_state::decode(&hash).apply_to(state);
            if state.time_travel.mode {
                info!("Restored historical view from URL");
                UpdateResult::message(Message::RefreshTimepoints)
            } else {
                UpdateResult::none()
            }
        }

        // ─────────────────────────────────────────────────────────
        // Time Travel Messages
        // ─────────────────────────────────────────────────────────
        Message::EnterHistorical { index } => time_travel::handle_enter_historical(state, index),
        Message::ScrubTo { timestamp } => time_travel::handle_scrub_to(state, timestamp),
        Message::StepForward => time_travel::handle_step(state, true),
        Message::StepBackward => time_travel::handle_step(state, false),
        Message::ReturnToLive => time_travel::handle_return_to_live(state),
        Message::SetWindowStart {
            start,
            enter_historical,
        } => time_travel::handle_set_window_start(state, start, enter_historical),
        Message::SetSpeed(speed) => {
            state.time_travel.speed = speed.max(1);
            UpdateResult::none()
        }
        Message::StartPlayback => time_travel::handle_start_playback(state),
        Message::StopPlayback => time_travel::handle_stop_playback(state),
        Message::TogglePlayback => {
            if state.time_travel.playing {
                UpdateResult::message(Message::StopPlayback)
            } else {
                UpdateResult::message(Message::StartPlayback)
            }
        }
        Message::PlaybackTick { now } => time_travel::handle_playback_tick(state, now),

        Message::RefreshTimepoints => time_travel::handle_refresh_timepoints(state),
        Message::TimepointsLoaded { index, follow_up } => {
            time_travel::handle_timepoints_loaded(state, index, follow_up)
        }
        Message::TimepointsFailed { error } => {
            warn!("Timepoint index fetch failed: {}", error);
            state.record_error(error);
            UpdateResult::none()
        }

        Message::SnapshotLoaded {
            timestamp,
            token,
            snapshot,
        } => time_travel::handle_snapshot_loaded(state, timestamp, token, *snapshot),
        Message::SnapshotFailed {
            timestamp,
            token,
            error,
        } => time_travel::handle_snapshot_failed(state, timestamp, token, error),
        Message::SnapshotPrefetched {
            timestamp,
            snapshot,
        } => time_travel::handle_snapshot_prefetched(state, timestamp, *snapshot),
    }
}
