//! Engine - orchestration state for runners
//!
//! The Engine owns the session state, the message channel, the snapshot
//! source, the playback ticker and the shutdown signal. Messages are
//! processed one at a time; background tasks only ever talk to the state
//! through the channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tracing::info;

use clusterart_source::SnapshotSource;

use crate::actions::{self, PlaybackTicker};
use crate::coloring::ColorMode;
use crate::config::Settings;
use crate::engine_event::EngineEvent;
use crate::frame::Frame;
use crate::handler;
use crate::layout::LayoutMode;
use crate::message::Message;
use crate::state::SessionState;
use crate::url_state;

/// Lightweight snapshot of state for change detection.
///
/// Captured before message processing, compared after to detect
/// what changed and emit appropriate EngineEvents.
#[derive(Debug, Clone, PartialEq)]
struct StateSnapshot {
    data_generation: u64,
    error_generation: u64,
    timepoint_count: usize,
    color_mode: ColorMode,
    layout_mode: LayoutMode,
    historical: bool,
    timestamp: Option<i64>,
    playing: bool,
    url_hash: String,
}

impl StateSnapshot {
    fn capture(state: &SessionState) -> Self {
        let tt = &state.time_travel;
        Self {
            data_generation: state.data_generation,
            error_generation: state.error_generation,
            timepoint_count: tt.available.len(),
            color_mode: state.color_mode,
            layout_mode: state.layout_mode,
            historical: tt.mode,
            timestamp: tt.timestamp,
            playing: tt.playing,
            url_hash: url_state::encode(state),
        }
    }
}

/// Orchestration engine for Cluster Art.
pub struct Engine<S> {
    /// TEA session state (the Model)
    pub state: SessionState,

    /// Sender half of the unified message channel.
    pub msg_tx: mpsc::Sender<Message>,

    /// Receiver half of the unified message channel.
    /// The runner drains messages from here.
    pub msg_rx: mpsc::Receiver<Message>,

    /// Sender for the shutdown signal. Send `true` to initiate shutdown.
    pub shutdown_tx: watch::Sender<bool>,

    /// Receiver for the shutdown signal. Clone for background tasks.
    pub shutdown_rx: watch::Receiver<bool>,

    /// Loaded settings
    pub settings: Settings,

    source: Arc<S>,

    ticker: PlaybackTicker,

    /// Event broadcaster for external consumers.
    event_tx: broadcast::Sender<EngineEvent>,
}

impl<S> Engine<S>
where
    S: SnapshotSource + Send + Sync + 'static,
{
    /// Create an engine reading snapshots from `source`.
    ///
    /// Nothing is fetched until [`Engine::start`].
    pub fn new(settings: Settings, source: S) -> Self {
        let state = SessionState::with_settings(&settings);
        let (msg_tx, msg_rx) = mpsc::channel::<Message>(256);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (event_tx, _) = broadcast::channel(256);

        Self {
            state,
            msg_tx,
            msg_rx,
            shutdown_tx,
            shutdown_rx,
            settings,
            source: Arc::new(source),
            ticker: PlaybackTicker::default(),
            event_tx,
        }
    }

    /// Subscribe to engine events.
    ///
    /// If the subscriber falls behind (buffer full), older events are
    /// dropped.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Kick off the initial fetches and the periodic live refresh.
    ///
    /// A session already switched to historical mode (restored from a URL
    /// hash or given a start timestamp) enters the nearest timepoint once the
    /// index arrives and skips the live fetch.
    pub fn start(&mut self, follow_live: bool) {
        self.process_message(Message::RefreshTimepoints);
        if self.state.time_travel.is_live() {
            self.process_message(Message::RefreshTick);
        }
        if follow_live {
            actions::spawn_refresh_timer(
                self.msg_tx.clone(),
                self.shutdown_rx.clone(),
                Duration::from_secs(self.settings.refresh.interval_secs),
            );
        }
    }

    /// Process a single message through the TEA update cycle, including any
    /// follow-up messages, and dispatch the resulting actions.
    pub fn process_message(&mut self, msg: Message) {
        let pre = StateSnapshot::capture(&self.state);

        let mut msg = Some(msg);
        while let Some(m) = msg {
            let result = handler::update(&mut self.state, m);
            if let Some(action) = result.action {
                actions::handle_action(action, &self.source, &self.msg_tx, &mut self.ticker);
            }
            msg = result.message;
        }

        let post = StateSnapshot::capture(&self.state);
        self.emit_events(&pre, &post);
    }

    /// Drain and process all pending messages from the channel.
    ///
    /// Returns the number of messages processed.
    pub fn drain_pending_messages(&mut self) -> usize {
        let mut count = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.process_message(msg);
            count += 1;
        }
        count
    }

    /// Get a clone of the message sender for spawning input sources.
    pub fn msg_sender(&self) -> mpsc::Sender<Message> {
        self.msg_tx.clone()
    }

    /// Get a clone of the shutdown receiver for background tasks.
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    pub fn should_quit(&self) -> bool {
        self.state.should_quit()
    }

    /// Current URL hash, without the leading `#`.
    pub fn url_hash(&self) -> String {
        url_state::encode(&self.state)
    }

    /// Lay out and color the current resources.
    pub fn frame(&mut self) -> Frame {
        Frame::build(&mut self.state)
    }

    /// Stop playback and signal background tasks to stop.
    pub async fn shutdown(&mut self) {
        self.emit(EngineEvent::Shutdown);
        self.ticker.stop();
        let _ = self.shutdown_tx.send(true);
        info!("Engine shut down");
    }

    /// Emit EngineEvents based on state changes after processing.
    fn emit_events(&self, pre: &StateSnapshot, post: &StateSnapshot) {
        if pre.historical != post.historical {
            self.emit(EngineEvent::TimeTravelChanged {
                historical: post.historical,
                timestamp: post.timestamp,
            });
        }

        if pre.timepoint_count != post.timepoint_count {
            self.emit(EngineEvent::TimelineUpdated {
                count: post.timepoint_count,
            });
        }

        if post.data_generation != pre.data_generation {
            self.emit(EngineEvent::DataLoaded {
                historical: post.historical,
                timestamp: if post.historical {
                    post.timestamp
                } else {
                    self.state.fetched_at
                },
                slot_count: self.state.resources.len(),
            });
        }

        if post.error_generation != pre.error_generation {
            if let Some(message) = &self.state.last_error {
                self.emit(EngineEvent::LoadFailed {
                    message: message.clone(),
                });
            }
        }

        if pre.color_mode != post.color_mode || pre.layout_mode != post.layout_mode {
            self.emit(EngineEvent::ModeChanged {
                color_mode: post.color_mode,
                layout_mode: post.layout_mode,
            });
        }

        if pre.playing != post.playing {
            self.emit(EngineEvent::PlaybackChanged {
                playing: post.playing,
            });
        }

        if pre.url_hash != post.url_hash {
            self.emit(EngineEvent::UrlChanged {
                hash: post.url_hash.clone(),
            });
        }
    }

    /// Emit a single EngineEvent to all subscribers.
    ///
    /// send() returns Err only if there are no receivers, which is fine.
    fn emit(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event);
    }
}
