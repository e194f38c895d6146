//! Application error types with rich context

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Snapshot Transport Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Request to {url} failed with HTTP status {status}")]
    HttpStatus { status: u16, url: String },

    #[error("No snapshot cached for timestamp {timestamp}")]
    SnapshotNotFound { timestamp: i64 },

    #[error("Cache folder not found: {path}")]
    CacheFolderMissing { path: PathBuf },

    #[error("Invalid timestamp: {value}")]
    InvalidTimestamp { value: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ─────────────────────────────────────────────────────────────
    // Channel/Communication Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Channel closed unexpectedly")]
    ChannelClosed,
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn http_status(status: u16, url: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
        }
    }

    pub fn snapshot_not_found(timestamp: i64) -> Self {
        Self::SnapshotNotFound { timestamp }
    }

    pub fn cache_folder_missing(path: impl Into<PathBuf>) -> Self {
        Self::CacheFolderMissing { path: path.into() }
    }

    pub fn invalid_timestamp(value: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            value: value.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Everything that can go wrong while fetching or decoding a snapshot is
    /// recoverable: the caller keeps rendering whatever it already has.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. }
                | Error::HttpStatus { .. }
                | Error::SnapshotNotFound { .. }
                | Error::Json(_)
                | Error::InvalidTimestamp { .. }
        )
    }

    /// Check if this error should stop the process
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::CacheFolderMissing { .. } | Error::Config { .. } | Error::ChannelClosed
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = Error::transport("connection refused");
        assert_eq!(err.to_string(), "Transport error: connection refused");

        let err = Error::http_status(503, "http://localhost:8000/api/cluster-status");
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("/api/cluster-status"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_transport_errors_are_recoverable() {
        assert!(Error::transport("reset").is_recoverable());
        assert!(Error::http_status(404, "/x").is_recoverable());
        assert!(Error::snapshot_not_found(1_700_000_000).is_recoverable());
        assert!(!Error::transport("reset").is_fatal());
    }

    #[test]
    fn test_fatal_errors() {
        assert!(Error::cache_folder_missing("/nope").is_fatal());
        assert!(Error::config("bad base url").is_fatal());
        assert!(Error::ChannelClosed.is_fatal());
        assert!(!Error::ChannelClosed.is_recoverable());
    }

    #[test]
    fn test_snapshot_not_found_mentions_timestamp() {
        let err = Error::snapshot_not_found(1_700_000_000);
        assert!(err.to_string().contains("1700000000"));
    }

    #[test]
    fn test_context_preserves_variant() {
        let res: std::result::Result<(), Error> = Err(Error::transport("boom"));
        let err = res.context("loading snapshot").unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
    }
}
