//! Time-travel handlers: entering and leaving historical mode, playback,
//! window changes and snapshot results.
//!
//! Every historical load is tagged with a token from
//! [`TimeTravelState::next_token`](crate::time_travel::TimeTravelState::next_token).
//! Results carrying an older token still land in the snapshot cache but never
//! replace the resources on display.

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use clusterart_core::{Snapshot, TimeWindow, TimepointIndex};

use crate::message::Message;
use crate::state::SessionState;
use crate::time_travel::{next_index, previous_index};

use super::{TimepointsFollowUp, UpdateAction, UpdateResult};

/// Enter historical mode at `index` and load its snapshot.
///
/// A cache hit is applied immediately; otherwise a fetch is issued. Either
/// way the uncached neighbours are queued for prefetch.
pub fn handle_enter_historical(state: &mut SessionState, index: usize) -> UpdateResult {
    let was_live = state.time_travel.is_live();
    let Some(timestamp) = state.time_travel.select(index) else {
        debug!("Ignoring out-of-range timepoint index {}", index);
        return UpdateResult::none();
    };
    if was_live {
        info!("Entering historical mode at {}", timestamp);
    }

    let tt = &mut state.time_travel;
    let token = tt.next_token();
    let prefetch = tt.prefetch_candidates();

    if let Some(snapshot) = tt.cache.get(timestamp).cloned() {
        debug!("Snapshot cache hit for {}", timestamp);
        state.load_snapshot(&snapshot);
        if prefetch.is_empty() {
            return UpdateResult::none();
        }
        return UpdateResult::action(UpdateAction::Prefetch {
            timestamps: prefetch,
        });
    }

    UpdateResult::action(UpdateAction::LoadSnapshot {
        timestamp,
        token,
        prefetch,
    })
}

pub fn handle_scrub_to(state: &mut SessionState, timestamp: i64) -> UpdateResult {
    match state.time_travel.available.nearest_index(timestamp) {
        Some(index) => handle_enter_historical(state, index),
        None => {
            debug!("No timepoints to scrub to");
            UpdateResult::none()
        }
    }
}

/// Step one timepoint, wrapping at both ends. From live, either direction
/// lands on the most recent timepoint.
pub fn handle_step(state: &mut SessionState, forward: bool) -> UpdateResult {
    let tt = &state.time_travel;
    let len = tt.available.len();
    if len == 0 {
        return UpdateResult::none();
    }
    let index = if tt.is_live() {
        len - 1
    } else if forward {
        next_index(tt.current_index, len)
    } else {
        previous_index(tt.current_index, len)
    };
    handle_enter_historical(state, index)
}

/// Stop playback, reset the window to end now, and go back to live data.
pub fn handle_return_to_live(state: &mut SessionState) -> UpdateResult {
    let tt = &mut state.time_travel;
    if tt.mode {
        info!("Returning to live mode");
    }
    tt.mode = false;
    tt.timestamp = None;
    tt.playing = false;
    tt.play_on_load = false;
    tt.clock.reset();
    tt.window_start = None;
    tt.window = tt.window_for(Utc::now());
    // Supersede any historical load still in flight.
    tt.next_token();

    UpdateResult::action(UpdateAction::ResumeLive { window: tt.window })
}

/// Move the query window. The snapshot cache only holds snapshots for the
/// old window, so it is dropped.
pub fn handle_set_window_start(
    state: &mut SessionState,
    start: i64,
    enter_historical: bool,
) -> UpdateResult {
    let tt = &mut state.time_travel;
    tt.window_start = Some(start);
    tt.window = tt.window_for(Utc::now());
    tt.cache.clear();
    info!("Time window now {} .. {}", tt.window.start, tt.window.end);

    let follow_up = if enter_historical {
        TimepointsFollowUp::EnterFirst
    } else {
        TimepointsFollowUp::None
    };
    UpdateResult::action(UpdateAction::FetchTimepoints {
        window: tt.window,
        follow_up,
    })
}

/// Refetch the index for the current window. A historical session with no
/// data yet (restored from a URL) enters at its timestamp once it arrives.
/// When that timestamp falls outside the default window, the window is
/// moved to surround it.
pub fn handle_refresh_timepoints(state: &mut SessionState) -> UpdateResult {
    let tt = &mut state.time_travel;
    tt.window = tt.window_for(Utc::now());
    let follow_up = match (tt.mode, tt.timestamp) {
        (true, Some(ts)) if state.data_generation == 0 => {
            if tt.window_start.is_none() && !tt.window.contains(ts) {
                let window = TimeWindow::centered_on(ts, tt.window_days);
                tt.window_start = Some(window.start);
                tt.window = window;
                info!("Time window moved to {} .. {} for {}", window.start, window.end, ts);
            }
            TimepointsFollowUp::EnterNearest(ts)
        }
        _ => TimepointsFollowUp::None,
    };
    UpdateResult::action(UpdateAction::FetchTimepoints {
        window: tt.window,
        follow_up,
    })
}

pub fn handle_timepoints_loaded(
    state: &mut SessionState,
    index: TimepointIndex,
    follow_up: TimepointsFollowUp,
) -> UpdateResult {
    debug!("Loaded {} timepoints", index.len());
    state.time_travel.set_available(index);

    let target = match follow_up {
        TimepointsFollowUp::None => None,
        TimepointsFollowUp::EnterFirst => (!state.time_travel.available.is_empty()).then_some(0),
        TimepointsFollowUp::EnterNearest(ts) => state.time_travel.available.nearest_index(ts),
    };
    let Some(target) = target else {
        if follow_up != TimepointsFollowUp::None {
            warn!("No timepoints available in the selected window");
        }
        return UpdateResult::none();
    };

    let result = handle_enter_historical(state, target);
    if state.time_travel.play_on_load {
        state.time_travel.play_on_load = false;
        return result.then(Message::StartPlayback);
    }
    result
}

/// Start playback. From live, playback begins at the start of the window.
pub fn handle_start_playback(state: &mut SessionState) -> UpdateResult {
    let tt = &mut state.time_travel;
    if tt.playing {
        return UpdateResult::none();
    }
    if tt.available.is_empty() {
        debug!("Nothing to play back");
        return UpdateResult::none();
    }
    let was_live = tt.is_live();
    tt.playing = true;
    tt.clock.reset();
    info!("Playback started at {}x", tt.speed);

    let result = UpdateResult::action(UpdateAction::StartPlayback);
    if was_live {
        return result.then(Message::EnterHistorical { index: 0 });
    }
    result
}

pub fn handle_stop_playback(state: &mut SessionState) -> UpdateResult {
    let tt = &mut state.time_travel;
    if !tt.playing {
        return UpdateResult::none();
    }
    tt.playing = false;
    tt.clock.reset();
    info!("Playback stopped");
    UpdateResult::action(UpdateAction::StopPlayback)
}

/// Advance one timepoint, wrapping to the first, whenever the step interval
/// for the current speed has elapsed.
pub fn handle_playback_tick(state: &mut SessionState, now: Instant) -> UpdateResult {
    let tt = &mut state.time_travel;
    if !tt.playing || tt.available.is_empty() {
        return UpdateResult::none();
    }
    if !tt.clock.tick(now, tt.speed) {
        return UpdateResult::none();
    }
    let index = next_index(tt.current_index, tt.available.len());
    handle_enter_historical(state, index)
}

pub fn handle_snapshot_loaded(
    state: &mut SessionState,
    timestamp: i64,
    token: u64,
    snapshot: Snapshot,
) -> UpdateResult {
    let tt = &state.time_travel;
    let applies = tt.is_current_token(token) && tt.mode && tt.timestamp == Some(timestamp);
    if applies {
        state.load_snapshot(&snapshot);
        debug!("Historical snapshot {} applied", timestamp);
    } else {
        debug!("Stale snapshot {} (token {}) cached only", timestamp, token);
    }
    if let Some(evicted) = state.time_travel.cache.insert(timestamp, snapshot) {
        debug!("Evicted cached snapshot {}", evicted);
    }
    UpdateResult::none()
}

/// A failed load leaves everything on display as it was.
pub fn handle_snapshot_failed(
    state: &mut SessionState,
    timestamp: i64,
    token: u64,
    error: String,
) -> UpdateResult {
    if state.time_travel.is_current_token(token) {
        warn!("Failed to load snapshot {}: {}", timestamp, error);
        state.record_error(error);
    } else {
        debug!("Ignoring stale failure for {}: {}", timestamp, error);
    }
    UpdateResult::none()
}

pub fn handle_snapshot_prefetched(
    state: &mut SessionState,
    timestamp: i64,
    snapshot: Snapshot,
) -> UpdateResult {
    let cache = &mut state.time_travel.cache;
    if !cache.contains(timestamp) {
        if let Some(evicted) = cache.insert(timestamp, snapshot) {
            debug!("Evicted cached snapshot {}", evicted);
        }
    }
    UpdateResult::none()
}
