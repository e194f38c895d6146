//! Action handlers: UpdateAction dispatch and background task spawning
//!
//! Every fetch runs as its own tokio task and reports back through the
//! message channel. The playback ticker is a long-lived task cancelled
//! through a `watch` channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use clusterart_core::TimeWindow;
use clusterart_source::SnapshotSource;

use crate::handler::{TimepointsFollowUp, UpdateAction};
use crate::message::Message;
use crate::time_travel::playback::TICK_PERIOD;

/// Handle to the running playback ticker, if any.
#[derive(Debug, Default)]
pub struct PlaybackTicker {
    stop_tx: Option<watch::Sender<bool>>,
}

impl PlaybackTicker {
    pub fn is_running(&self) -> bool {
        self.stop_tx.is_some()
    }

    /// Spawn the ticker, replacing any running one.
    pub fn start(&mut self, msg_tx: mpsc::Sender<Message>) {
        self.stop();
        let (stop_tx, stop_rx) = watch::channel(false);
        spawn_ticker(msg_tx, stop_rx, TICK_PERIOD);
        self.stop_tx = Some(stop_tx);
    }

    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
    }
}

/// Execute an action by spawning background tasks
pub fn handle_action<S>(
    action: UpdateAction,
    source: &Arc<S>,
    msg_tx: &mpsc::Sender<Message>,
    ticker: &mut PlaybackTicker,
) where
    S: SnapshotSource + Send + Sync + 'static,
{
    match action {
        UpdateAction::FetchLive => {
            spawn_fetch_live(source.clone(), msg_tx.clone());
        }

        UpdateAction::LoadSnapshot {
            timestamp,
            token,
            prefetch,
        } => {
            spawn_load_snapshot(source.clone(), msg_tx.clone(), timestamp, token);
            spawn_prefetch(source.clone(), msg_tx.clone(), prefetch);
        }

        UpdateAction::Prefetch { timestamps } => {
            spawn_prefetch(source.clone(), msg_tx.clone(), timestamps);
        }

        UpdateAction::FetchTimepoints { window, follow_up } => {
            spawn_fetch_timepoints(source.clone(), msg_tx.clone(), window, follow_up);
        }

        UpdateAction::StartPlayback => {
            ticker.start(msg_tx.clone());
        }

        UpdateAction::StopPlayback => {
            ticker.stop();
        }

        UpdateAction::ResumeLive { window } => {
            ticker.stop();
            spawn_fetch_timepoints(
                source.clone(),
                msg_tx.clone(),
                window,
                TimepointsFollowUp::None,
            );
            spawn_fetch_live(source.clone(), msg_tx.clone());
        }
    }
}

fn spawn_fetch_live<S>(source: Arc<S>, msg_tx: mpsc::Sender<Message>)
where
    S: SnapshotSource + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let msg = match source.fetch_live().await {
            Ok(snapshot) => Message::LiveSnapshotLoaded {
                snapshot: Box::new(snapshot),
            },
            Err(e) => Message::LiveSnapshotFailed {
                error: e.to_string(),
            },
        };
        let _ = msg_tx.send(msg).await;
    });
}

fn spawn_load_snapshot<S>(
    source: Arc<S>,
    msg_tx: mpsc::Sender<Message>,
    timestamp: i64,
    token: u64,
) where
    S: SnapshotSource + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let msg = match source.fetch_at(timestamp).await {
            Ok(snapshot) => Message::SnapshotLoaded {
                timestamp,
                token,
                snapshot: Box::new(snapshot),
            },
            Err(e) => Message::SnapshotFailed {
                timestamp,
                token,
                error: e.to_string(),
            },
        };
        let _ = msg_tx.send(msg).await;
    });
}

/// Preload `timestamps` one after another. Failures are logged and dropped.
fn spawn_prefetch<S>(source: Arc<S>, msg_tx: mpsc::Sender<Message>, timestamps: Vec<i64>)
where
    S: SnapshotSource + Send + Sync + 'static,
{
    if timestamps.is_empty() {
        return;
    }
    tokio::spawn(async move {
        for timestamp in timestamps {
            match source.fetch_at(timestamp).await {
                Ok(snapshot) => {
                    let msg = Message::SnapshotPrefetched {
                        timestamp,
                        snapshot: Box::new(snapshot),
                    };
                    if msg_tx.send(msg).await.is_err() {
                        return;
                    }
                }
                Err(e) => debug!("Prefetch of {} failed: {}", timestamp, e),
            }
        }
    });
}

fn spawn_fetch_timepoints<S>(
    source: Arc<S>,
    msg_tx: mpsc::Sender<Message>,
    window: TimeWindow,
    follow_up: TimepointsFollowUp,
) where
    S: SnapshotSource + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let msg = match source.fetch_timepoints(window).await {
            Ok(index) => Message::TimepointsLoaded { index, follow_up },
            Err(e) => Message::TimepointsFailed {
                error: e.to_string(),
            },
        };
        let _ = msg_tx.send(msg).await;
    });
}

/// Send `PlaybackTick` every `period` until `stop_rx` flips or the channel
/// closes.
fn spawn_ticker(
    msg_tx: mpsc::Sender<Message>,
    mut stop_rx: watch::Receiver<bool>,
    period: Duration,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                instant = interval.tick() => {
                    let msg = Message::PlaybackTick { now: instant.into_std() };
                    if msg_tx.send(msg).await.is_err() {
                        break;
                    }
                }
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("Playback ticker stopped");
    });
}

/// Send `RefreshTick` every `period` (first one after a full period) until
/// `shutdown_rx` flips.
pub fn spawn_refresh_timer(
    msg_tx: mpsc::Sender<Message>,
    mut shutdown_rx: watch::Receiver<bool>,
    period: Duration,
) {
    if period.is_zero() {
        warn!("Live refresh disabled: zero interval");
        return;
    }
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if msg_tx.send(Message::RefreshTick).await.is_err() {
                        break;
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    });
}
