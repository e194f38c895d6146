//! Tests for handler module

use std::time::{Duration, Instant};

use super::*;
use crate::message::Message;
use crate::state::SessionState;
use crate::time_travel::step_interval;
use clusterart_core::{Snapshot, TimepointIndex};
use clusterart_source::test_utils::test_snapshot;

/// Session with `timestamps` as the available timepoints, still live
fn state_with_timeline(timestamps: &[i64]) -> SessionState {
    let mut state = SessionState::new();
    state
        .time_travel
        .set_available(TimepointIndex::from_unsorted(timestamps.to_vec(), None, None));
    state
}

fn snapshot_for(timestamp: i64) -> Box<Snapshot> {
    Box::new(test_snapshot(&format!("t{}", timestamp), 2, &[(0, "alice")]))
}

fn displayed_host(state: &SessionState) -> Option<&str> {
    state.resources.first().map(|r| r.hostname.as_str())
}

/// Enter historical at `index` and deliver its snapshot
fn enter_and_load(state: &mut SessionState, index: usize) {
    let result = update(state, Message::EnterHistorical { index });
    if let Some(UpdateAction::LoadSnapshot {
        timestamp, token, ..
    }) = result.action
    {
        update(
            state,
            Message::SnapshotLoaded {
                timestamp,
                token,
                snapshot: snapshot_for(timestamp),
            },
        );
    }
}

// ─────────────────────────────────────────────────────────
// Live / View
// ─────────────────────────────────────────────────────────

#[test]
fn test_quit_message_requests_quit() {
    let mut state = SessionState::new();
    assert!(!state.should_quit());
    update(&mut state, Message::Quit);
    assert!(state.should_quit());
}

#[test]
fn test_refresh_tick_fetches_live() {
    let mut state = SessionState::new();
    let result = update(&mut state, Message::RefreshTick);
    assert_eq!(result.action, Some(UpdateAction::FetchLive));
}

#[test]
fn test_refresh_tick_ignored_in_historical_mode() {
    let mut state = state_with_timeline(&[10, 20]);
    enter_and_load(&mut state, 0);

    let result = update(&mut state, Message::RefreshTick);
    assert!(result.action.is_none());
    assert!(result.message.is_none());
}

#[test]
fn test_live_snapshot_discarded_in_historical_mode() {
    let mut state = state_with_timeline(&[10, 20]);
    enter_and_load(&mut state, 1);
    let generation = state.data_generation;

    update(
        &mut state,
        Message::LiveSnapshotLoaded {
            snapshot: Box::new(test_snapshot("live", 4, &[])),
        },
    );

    assert_eq!(state.data_generation, generation);
    assert_eq!(displayed_host(&state), Some("t20"));
}

#[test]
fn test_live_snapshot_applied_when_live() {
    let mut state = SessionState::new();
    update(
        &mut state,
        Message::LiveSnapshotLoaded {
            snapshot: Box::new(test_snapshot("live", 4, &[])),
        },
    );
    assert_eq!(state.resources.len(), 4);
    assert_eq!(displayed_host(&state), Some("live"));
}

#[test]
fn test_live_failure_keeps_resources() {
    let mut state = SessionState::new();
    update(
        &mut state,
        Message::LiveSnapshotLoaded {
            snapshot: Box::new(test_snapshot("live", 4, &[])),
        },
    );
    update(
        &mut state,
        Message::LiveSnapshotFailed {
            error: "connection refused".to_string(),
        },
    );
    assert_eq!(state.resources.len(), 4);
    assert_eq!(state.last_error.as_deref(), Some("connection refused"));
    assert_eq!(state.error_generation, 1);
}

#[test]
fn test_mode_messages_reject_out_of_range() {
    let mut state = SessionState::new();
    update(&mut state, Message::SetColorMode(6));
    update(&mut state, Message::SetColorMode(0));
    update(&mut state, Message::SetColorMode(10));
    assert_eq!(state.color_mode.index(), 6);

    update(&mut state, Message::SetLayoutMode(7));
    update(&mut state, Message::SetLayoutMode(0));
    update(&mut state, Message::SetLayoutMode(10));
    assert_eq!(state.layout_mode.index(), 7);
}

#[test]
fn test_drag_moves_canvas() {
    let mut state = SessionState::new();
    update(&mut state, Message::DragStart { x: 50.0, y: 50.0 });
    update(&mut state, Message::DragMove { x: 80.0, y: 20.0 });
    update(&mut state, Message::DragEnd);
    update(&mut state, Message::DragMove { x: 500.0, y: 500.0 });
    assert_eq!((state.canvas.x, state.canvas.y), (30.0, -30.0));
}

#[test]
fn test_panel_toggles() {
    let mut state = SessionState::new();
    update(&mut state, Message::ToggleLegend);
    update(&mut state, Message::ToggleHelp);
    update(&mut state, Message::ToggleHelp);
    assert!(state.panels.legend_expanded);
    assert!(!state.panels.help_expanded);
}

// ─────────────────────────────────────────────────────────
// Entering Historical Mode
// ─────────────────────────────────────────────────────────

#[test]
fn test_enter_historical_cache_miss_issues_load() {
    let timeline: Vec<i64> = (1..=9).map(|i| i * 10).collect();
    let mut state = state_with_timeline(&timeline);

    let result = update(&mut state, Message::EnterHistorical { index: 4 });

    assert!(state.time_travel.mode);
    assert_eq!(state.time_travel.timestamp, Some(50));
    assert_eq!(state.time_travel.current_index, 4);
    match result.action {
        Some(UpdateAction::LoadSnapshot {
            timestamp,
            token,
            prefetch,
        }) => {
            assert_eq!(timestamp, 50);
            assert!(state.time_travel.is_current_token(token));
            assert_eq!(prefetch, vec![60, 40, 70, 30, 80, 20]);
        }
        other => panic!("Expected LoadSnapshot, got {:?}", other),
    }
}

#[test]
fn test_enter_historical_cache_hit_applies_synchronously() {
    let mut state = state_with_timeline(&[10, 20, 30]);
    state.time_travel.cache.insert(20, *snapshot_for(20));

    let result = update(&mut state, Message::EnterHistorical { index: 1 });

    assert_eq!(displayed_host(&state), Some("t20"));
    assert_eq!(
        result.action,
        Some(UpdateAction::Prefetch {
            timestamps: vec![30, 10]
        })
    );
}

#[test]
fn test_enter_historical_out_of_range_is_noop() {
    let mut state = state_with_timeline(&[10]);
    let result = update(&mut state, Message::EnterHistorical { index: 5 });
    assert!(result.action.is_none());
    assert!(state.time_travel.is_live());
}

#[test]
fn test_scrub_to_nearest_timepoint() {
    let mut state = state_with_timeline(&[100, 200, 300]);
    update(&mut state, Message::ScrubTo { timestamp: 240 });
    assert_eq!(state.time_travel.timestamp, Some(200));
}

#[test]
fn test_step_from_live_lands_on_latest() {
    let mut state = state_with_timeline(&[10, 20, 30]);
    update(&mut state, Message::StepBackward);
    assert_eq!(state.time_travel.current_index, 2);
}

#[test]
fn test_step_wraps_both_ways() {
    let mut state = state_with_timeline(&[10, 20, 30]);
    enter_and_load(&mut state, 2);
    update(&mut state, Message::StepForward);
    assert_eq!(state.time_travel.current_index, 0);
    update(&mut state, Message::StepBackward);
    assert_eq!(state.time_travel.current_index, 2);
}

// ─────────────────────────────────────────────────────────
// Snapshot Results
// ─────────────────────────────────────────────────────────

#[test]
fn test_stale_load_only_reaches_cache() {
    let mut state = state_with_timeline(&[10, 20, 30]);

    let first = update(&mut state, Message::EnterHistorical { index: 0 });
    let Some(UpdateAction::LoadSnapshot { token: stale, .. }) = first.action else {
        panic!("Expected LoadSnapshot");
    };
    let second = update(&mut state, Message::EnterHistorical { index: 2 });
    let Some(UpdateAction::LoadSnapshot { token: fresh, .. }) = second.action else {
        panic!("Expected LoadSnapshot");
    };

    // The newer load completes first, then the older one straggles in.
    update(
        &mut state,
        Message::SnapshotLoaded {
            timestamp: 30,
            token: fresh,
            snapshot: snapshot_for(30),
        },
    );
    update(
        &mut state,
        Message::SnapshotLoaded {
            timestamp: 10,
            token: stale,
            snapshot: snapshot_for(10),
        },
    );

    assert_eq!(displayed_host(&state), Some("t30"));
    assert_eq!(state.time_travel.timestamp, Some(30));
    assert!(state.time_travel.cache.contains(10));
    assert!(state.time_travel.cache.contains(30));
}

#[test]
fn test_load_after_return_to_live_is_not_applied() {
    let mut state = state_with_timeline(&[10, 20]);
    let result = update(&mut state, Message::EnterHistorical { index: 0 });
    let Some(UpdateAction::LoadSnapshot { token, .. }) = result.action else {
        panic!("Expected LoadSnapshot");
    };
    update(&mut state, Message::ReturnToLive);

    update(
        &mut state,
        Message::SnapshotLoaded {
            timestamp: 10,
            token,
            snapshot: snapshot_for(10),
        },
    );

    assert!(state.resources.is_empty());
    assert!(state.time_travel.cache.contains(10));
}

#[test]
fn test_snapshot_failure_leaves_state_unchanged() {
    let mut state = state_with_timeline(&[10, 20, 30]);
    enter_and_load(&mut state, 0);
    let result = update(&mut state, Message::EnterHistorical { index: 1 });
    let Some(UpdateAction::LoadSnapshot { token, .. }) = result.action else {
        panic!("Expected LoadSnapshot");
    };

    update(
        &mut state,
        Message::SnapshotFailed {
            timestamp: 20,
            token,
            error: "HTTP 500".to_string(),
        },
    );

    assert_eq!(displayed_host(&state), Some("t10"));
    assert_eq!(state.time_travel.available.len(), 3);
    assert_eq!(state.last_error.as_deref(), Some("HTTP 500"));
}

#[test]
fn test_stale_failure_is_not_reported() {
    let mut state = state_with_timeline(&[10, 20]);
    update(&mut state, Message::EnterHistorical { index: 0 });
    update(
        &mut state,
        Message::SnapshotFailed {
            timestamp: 10,
            token: 0,
            error: "timeout".to_string(),
        },
    );
    assert!(state.last_error.is_none());
}

#[test]
fn test_timepoints_failure_keeps_index() {
    let mut state = state_with_timeline(&[10, 20, 30]);
    update(
        &mut state,
        Message::TimepointsFailed {
            error: "HTTP 503".to_string(),
        },
    );
    assert_eq!(state.time_travel.available.len(), 3);
    assert_eq!(state.error_generation, 1);
}

#[test]
fn test_prefetch_fills_cache_without_display() {
    let mut state = state_with_timeline(&[10, 20]);
    update(
        &mut state,
        Message::SnapshotPrefetched {
            timestamp: 20,
            snapshot: snapshot_for(20),
        },
    );
    assert!(state.time_travel.cache.contains(20));
    assert!(state.resources.is_empty());
}

#[test]
fn test_cache_is_bounded_under_loads() {
    let timeline: Vec<i64> = (0..30).collect();
    let mut state = state_with_timeline(&timeline);
    for index in 0..30 {
        enter_and_load(&mut state, index);
    }
    assert_eq!(state.time_travel.cache.len(), 20);
    assert!(!state.time_travel.cache.contains(9));
    assert!(state.time_travel.cache.contains(10));
}

// ─────────────────────────────────────────────────────────
// Playback
// ─────────────────────────────────────────────────────────

#[test]
fn test_playback_wraps_from_last_to_first() {
    let mut state = state_with_timeline(&[10, 20, 30]);
    enter_and_load(&mut state, 2);
    state.time_travel.speed = 60;

    let result = update(&mut state, Message::StartPlayback);
    assert_eq!(result.action, Some(UpdateAction::StartPlayback));
    assert!(result.message.is_none());

    let t0 = Instant::now();
    let armed = update(&mut state, Message::PlaybackTick { now: t0 });
    assert!(armed.action.is_none());
    assert_eq!(state.time_travel.current_index, 2);

    let early = update(
        &mut state,
        Message::PlaybackTick {
            now: t0 + Duration::from_millis(50),
        },
    );
    assert!(early.action.is_none());

    let due = update(
        &mut state,
        Message::PlaybackTick {
            now: t0 + step_interval(60),
        },
    );
    assert_eq!(state.time_travel.current_index, 0);
    assert_eq!(state.time_travel.timestamp, Some(10));
    assert!(matches!(
        due.action,
        Some(UpdateAction::LoadSnapshot { timestamp: 10, .. })
    ));
}

#[test]
fn test_start_while_playing_is_noop() {
    let mut state = state_with_timeline(&[10, 20]);
    enter_and_load(&mut state, 0);
    update(&mut state, Message::StartPlayback);
    let again = update(&mut state, Message::StartPlayback);
    assert!(again.action.is_none());
    assert!(state.time_travel.playing);
}

#[test]
fn test_stop_while_stopped_is_noop() {
    let mut state = state_with_timeline(&[10, 20]);
    let result = update(&mut state, Message::StopPlayback);
    assert!(result.action.is_none());

    update(&mut state, Message::StartPlayback);
    let stop = update(&mut state, Message::StopPlayback);
    assert_eq!(stop.action, Some(UpdateAction::StopPlayback));
    assert!(!state.time_travel.playing);
}

#[test]
fn test_start_playback_from_live_enters_first_timepoint() {
    let mut state = state_with_timeline(&[10, 20]);
    let result = update(&mut state, Message::StartPlayback);
    assert!(matches!(
        result.message,
        Some(Message::EnterHistorical { index: 0 })
    ));
}

#[test]
fn test_start_playback_without_timepoints_is_noop() {
    let mut state = SessionState::new();
    let result = update(&mut state, Message::StartPlayback);
    assert!(result.action.is_none());
    assert!(!state.time_travel.playing);
}

#[test]
fn test_toggle_playback_routes() {
    let mut state = state_with_timeline(&[10]);
    let result = update(&mut state, Message::TogglePlayback);
    assert!(matches!(result.message, Some(Message::StartPlayback)));
}

#[test]
fn test_ticks_ignored_when_stopped() {
    let mut state = state_with_timeline(&[10, 20]);
    enter_and_load(&mut state, 0);
    let result = update(
        &mut state,
        Message::PlaybackTick {
            now: Instant::now(),
        },
    );
    assert!(result.action.is_none());
    assert_eq!(state.time_travel.current_index, 0);
}

// ─────────────────────────────────────────────────────────
// Live Return / Window
// ─────────────────────────────────────────────────────────

#[test]
fn test_return_to_live_resets_session() {
    let mut state = state_with_timeline(&[10, 20]);
    enter_and_load(&mut state, 0);
    update(&mut state, Message::StartPlayback);
    update(
        &mut state,
        Message::SetWindowStart {
            start: 0,
            enter_historical: false,
        },
    );

    let result = update(&mut state, Message::ReturnToLive);

    let tt = &state.time_travel;
    assert!(tt.is_live());
    assert!(!tt.playing);
    assert!(tt.window_start.is_none());
    assert_eq!(
        result.action,
        Some(UpdateAction::ResumeLive { window: tt.window })
    );
}

#[test]
fn test_window_change_clears_cache() {
    let mut state = state_with_timeline(&[10, 20]);
    enter_and_load(&mut state, 0);
    assert!(!state.time_travel.cache.is_empty());

    let result = update(
        &mut state,
        Message::SetWindowStart {
            start: 1_000,
            enter_historical: true,
        },
    );

    assert!(state.time_travel.cache.is_empty());
    assert_eq!(state.time_travel.window.start, 1_000);
    assert_eq!(
        result.action,
        Some(UpdateAction::FetchTimepoints {
            window: state.time_travel.window,
            follow_up: TimepointsFollowUp::EnterFirst,
        })
    );
}

#[test]
fn test_timepoints_loaded_enter_first() {
    let mut state = SessionState::new();
    let result = update(
        &mut state,
        Message::TimepointsLoaded {
            index: TimepointIndex::from_unsorted(vec![300, 100, 200], None, None),
            follow_up: TimepointsFollowUp::EnterFirst,
        },
    );
    assert_eq!(state.time_travel.timestamp, Some(100));
    assert!(matches!(
        result.action,
        Some(UpdateAction::LoadSnapshot { timestamp: 100, .. })
    ));
}

#[test]
fn test_timepoints_loaded_empty_stays_live() {
    let mut state = SessionState::new();
    let result = update(
        &mut state,
        Message::TimepointsLoaded {
            index: TimepointIndex::default(),
            follow_up: TimepointsFollowUp::EnterFirst,
        },
    );
    assert!(result.action.is_none());
    assert!(state.time_travel.is_live());
}

#[test]
fn test_restore_from_url_resumes_playback_after_index() {
    let mut state = SessionState::new();

    let restore = update(
        &mut state,
        Message::RestoreFromUrl {
            hash: "#ts=205&speed=5000&play=1".to_string(),
        },
    );
    assert!(matches!(restore.message, Some(Message::RefreshTimepoints)));

    let refresh = update(&mut state, Message::RefreshTimepoints);
    let Some(UpdateAction::FetchTimepoints { follow_up, .. }) = refresh.action else {
        panic!("Expected FetchTimepoints");
    };
    assert_eq!(follow_up, TimepointsFollowUp::EnterNearest(205));

    let loaded = update(
        &mut state,
        Message::TimepointsLoaded {
            index: TimepointIndex::from_unsorted(vec![100, 200, 300], None, None),
            follow_up,
        },
    );
    assert_eq!(state.time_travel.timestamp, Some(200));
    assert_eq!(state.time_travel.speed, 5000);
    assert!(!state.time_travel.play_on_load);
    assert!(matches!(loaded.message, Some(Message::StartPlayback)));
}

#[test]
fn test_restore_old_timestamp_moves_window_around_it() {
    let mut state = SessionState::new();
    update(
        &mut state,
        Message::RestoreFromUrl {
            hash: "#ts=1700000000".to_string(),
        },
    );

    let refresh = update(&mut state, Message::RefreshTimepoints);
    let Some(UpdateAction::FetchTimepoints { window, follow_up }) = refresh.action else {
        panic!("Expected FetchTimepoints");
    };
    assert!(window.contains(1_700_000_000));
    assert_eq!(state.time_travel.window, window);
    assert_eq!(state.time_travel.window_start, Some(window.start));
    assert_eq!(follow_up, TimepointsFollowUp::EnterNearest(1_700_000_000));

    update(
        &mut state,
        Message::TimepointsLoaded {
            index: TimepointIndex::from_unsorted(
                vec![1_699_999_880, 1_700_000_000, 1_700_000_120],
                None,
                None,
            ),
            follow_up,
        },
    );
    assert_eq!(state.time_travel.timestamp, Some(1_700_000_000));
}

#[test]
fn test_restore_keeps_explicit_window_start() {
    let mut state = SessionState::new();
    update(
        &mut state,
        Message::RestoreFromUrl {
            hash: "#ts=1700000000&start=1600000000".to_string(),
        },
    );

    let refresh = update(&mut state, Message::RefreshTimepoints);
    let Some(UpdateAction::FetchTimepoints { window, .. }) = refresh.action else {
        panic!("Expected FetchTimepoints");
    };
    assert_eq!(window.start, 1_600_000_000);
    assert_eq!(state.time_travel.window_start, Some(1_600_000_000));
}

#[test]
fn test_restore_with_extreme_window_start_does_not_overflow() {
    let mut state = SessionState::new();
    let restore = update(
        &mut state,
        Message::RestoreFromUrl {
            hash: "#ts=1700000000&start=9223372036854775807".to_string(),
        },
    );
    assert!(matches!(restore.message, Some(Message::RefreshTimepoints)));

    let refresh = update(&mut state, Message::RefreshTimepoints);
    let Some(UpdateAction::FetchTimepoints { window, .. }) = refresh.action else {
        panic!("Expected FetchTimepoints");
    };
    assert_eq!(window.start, i64::MAX);
    assert_eq!(window.end, i64::MAX);
}
