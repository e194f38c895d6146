//! Headless mode runner - main event loop without a renderer
//!
//! Loads a snapshot from the chosen origin, lays it out, colors it and prints
//! the result as NDJSON. With `follow`, keeps running and prints a new frame
//! for every live refresh until interrupted.

use std::path::PathBuf;
use std::time::Duration;

use chrono::DateTime;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use clusterart_app::config::Settings;
use clusterart_app::{url_state, Engine, EngineEvent, Frame, Message, SessionState};
use clusterart_core::prelude::*;
use clusterart_source::{decode_snapshot, DiskCacheSource, HttpSource, SnapshotSource};

use super::HeadlessEvent;

/// Where snapshots come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOrigin {
    /// Caching backend base URL
    Http(String),
    /// Backend cache folder
    CacheDir(PathBuf),
    /// A single snapshot file, plain or gzipped
    File(PathBuf),
}

/// Options for one headless run.
#[derive(Debug, Clone, Default)]
pub struct HeadlessOptions {
    pub origin: Option<SnapshotOrigin>,
    /// 1-based layout mode
    pub layout: Option<u8>,
    /// 1-based color mode
    pub color: Option<u8>,
    pub grid: Option<(u32, u32)>,
    /// Unix seconds or RFC 3339
    pub at: Option<String>,
    /// Session URL hash to restore
    pub hash: Option<String>,
    /// Keep printing frames as live refreshes arrive
    pub follow: bool,
}

/// Parse `--at`: unix seconds or an RFC 3339 timestamp.
pub fn parse_timestamp(value: &str) -> Result<i64> {
    if let Ok(ts) = value.trim().parse::<i64>() {
        return Ok(ts);
    }
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.timestamp())
        .map_err(|_| Error::invalid_timestamp(value))
}

/// Run in headless mode - output JSON events instead of drawing
pub async fn run_headless(settings: Settings, options: HeadlessOptions) -> Result<()> {
    info!("═══════════════════════════════════════════════════════");
    info!("Cluster Art starting in HEADLESS mode");
    info!("═══════════════════════════════════════════════════════");

    let origin = options.origin.clone().unwrap_or_else(|| {
        match settings.source.cache_folder.clone() {
            Some(folder) => SnapshotOrigin::CacheDir(folder),
            None => SnapshotOrigin::Http(settings.source.base_url.clone()),
        }
    });
    info!("Snapshot origin: {:?}", origin);

    let result = match origin {
        SnapshotOrigin::File(path) => render_file(&settings, &options, path),
        SnapshotOrigin::CacheDir(folder) if !folder.is_dir() => {
            Err(Error::cache_folder_missing(folder))
        }
        SnapshotOrigin::CacheDir(folder) => {
            run_with_source(settings, DiskCacheSource::new(folder), &options).await
        }
        SnapshotOrigin::Http(base_url) => {
            let timeout = Duration::from_secs(settings.source.request_timeout_secs);
            let source = HttpSource::new(&base_url, timeout)?;
            run_with_source(settings, source, &options).await
        }
    };

    if let Err(ref e) = result {
        error!("Headless run failed: {:?}", e);
        HeadlessEvent::error(e.to_string(), e.is_fatal()).emit();
    }
    info!("Cluster Art headless mode exiting");
    result
}

/// Apply the view and time options to a fresh session.
fn configure(state: &mut SessionState, options: &HeadlessOptions) -> Result<()> {
    if let Some(hash) = &options.hash {
        url_state::decode(hash).apply_to(state);
    }
    if let Some(index) = options.layout {
        if !state.set_layout_mode(index) {
            return Err(Error::config(format!("layout must be 1-9, got {}", index)));
        }
    }
    if let Some(index) = options.color {
        if !state.set_color_mode(index) {
            return Err(Error::config(format!("color must be 1-9, got {}", index)));
        }
    }
    if let Some((width, height)) = options.grid {
        state.grid = clusterart_app::GridSize::new(width, height);
    }
    if let Some(at) = &options.at {
        let ts = parse_timestamp(at)?;
        state.time_travel.mode = true;
        state.time_travel.timestamp = Some(ts);
    }
    Ok(())
}

/// Render a single snapshot file without the engine.
fn render_file(settings: &Settings, options: &HeadlessOptions, path: PathBuf) -> Result<()> {
    let mut state = SessionState::with_settings(settings);
    configure(&mut state, options)?;

    let bytes = std::fs::read(&path).with_context(|| format!("Reading {}", path.display()))?;
    let snapshot = decode_snapshot(&bytes)?;
    state.load_snapshot(&snapshot);
    info!("Loaded {} slots from {}", state.resources.len(), path.display());

    HeadlessEvent::frame(Frame::build(&mut state)).emit();
    Ok(())
}

async fn run_with_source<S>(settings: Settings, source: S, options: &HeadlessOptions) -> Result<()>
where
    S: SnapshotSource + Send + Sync + 'static,
{
    // One-shot runs give up when nothing arrives within this long.
    let deadline = Duration::from_secs(settings.source.request_timeout_secs.saturating_mul(2));

    let mut engine = Engine::new(settings, source);
    configure(&mut engine.state, options)?;
    let mut events = engine.subscribe();

    engine.start(options.follow);

    let result = if options.follow {
        follow_loop(&mut engine, &mut events).await
    } else {
        match tokio::time::timeout(deadline, one_shot_loop(&mut engine, &mut events)).await {
            Ok(result) => result,
            Err(_) => Err(Error::transport("timed out waiting for a snapshot")),
        }
    };

    engine.shutdown().await;
    result
}

/// Process messages until the first snapshot is on display, print it, stop.
async fn one_shot_loop<S>(
    engine: &mut Engine<S>,
    events: &mut broadcast::Receiver<EngineEvent>,
) -> Result<()>
where
    S: SnapshotSource + Send + Sync + 'static,
{
    loop {
        let Some(msg) = engine.msg_rx.recv().await else {
            return Err(Error::ChannelClosed);
        };
        engine.process_message(msg);

        while let Ok(event) = events.try_recv() {
            match event {
                EngineEvent::DataLoaded { .. } => {
                    HeadlessEvent::frame(engine.frame()).emit();
                    return Ok(());
                }
                EngineEvent::LoadFailed { message } => {
                    warn!("Load failed: {}", message);
                    HeadlessEvent::error(message, false).emit();
                }
                _ => {}
            }
        }
    }
}

/// Print a frame for every load until Ctrl+C.
async fn follow_loop<S>(
    engine: &mut Engine<S>,
    events: &mut broadcast::Receiver<EngineEvent>,
) -> Result<()>
where
    S: SnapshotSource + Send + Sync + 'static,
{
    let quit_tx = engine.msg_sender();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received");
            let _ = quit_tx.send(Message::Quit).await;
        }
    });

    loop {
        if engine.should_quit() {
            info!("Quit requested");
            return Ok(());
        }

        let Some(msg) = engine.msg_rx.recv().await else {
            info!("Message channel closed");
            return Ok(());
        };
        engine.process_message(msg);

        loop {
            match events.try_recv() {
                Ok(EngineEvent::DataLoaded { .. }) => HeadlessEvent::frame(engine.frame()).emit(),
                Ok(EngineEvent::TimelineUpdated { count }) => HeadlessEvent::timeline(count).emit(),
                Ok(EngineEvent::UrlChanged { hash }) => HeadlessEvent::url_changed(hash).emit(),
                Ok(EngineEvent::LoadFailed { message }) => {
                    HeadlessEvent::error(message, false).emit()
                }
                Ok(_) => {}
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!("Headless output lagged by {} events", n);
                }
                Err(_) => break,
            }
        }
    }
}
