//! Headless mode - JSON output for scripts and renderers
//!
//! Events are output as NDJSON (newline-delimited JSON), one event per line.
//! Each event has an "event" field indicating its type.
//!
//! # Example Output
//!
//! ```json
//! {"event":"timeline","count":2016,"timestamp":1704700001000}
//! {"event":"frame","frame":{"layout":"Rack Topology",...},"timestamp":1704700002000}
//! {"event":"error","message":"HTTP 503 from http://...","fatal":false,"timestamp":1704700003000}
//! ```

pub mod runner;

use std::io::{self, Write};

use chrono::Utc;
use serde::Serialize;
use tracing::error;

use clusterart_app::Frame;

pub use runner::{run_headless, HeadlessOptions, SnapshotOrigin};

/// Events emitted in headless mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// Laid-out, colored slots ready to draw
    Frame { frame: Box<Frame>, timestamp: i64 },

    /// Timepoint index loaded
    Timeline { count: usize, timestamp: i64 },

    /// Session URL hash changed
    UrlChanged { hash: String, timestamp: i64 },

    /// Error occurred
    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }
        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn frame(frame: Frame) -> Self {
        Self::Frame {
            frame: Box::new(frame),
            timestamp: Self::now(),
        }
    }

    pub fn timeline(count: usize) -> Self {
        Self::Timeline {
            count,
            timestamp: Self::now(),
        }
    }

    pub fn url_changed(hash: String) -> Self {
        Self::UrlChanged {
            hash,
            timestamp: Self::now(),
        }
    }

    pub fn error(message: impl Into<String>, fatal: bool) -> Self {
        Self::Error {
            message: message.into(),
            fatal,
            timestamp: Self::now(),
        }
    }
}
