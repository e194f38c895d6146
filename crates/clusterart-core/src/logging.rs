//! Logging configuration using tracing
//!
//! Output goes to a daily-rotated file so that the NDJSON on stdout stays
//! machine-readable.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Environment variable controlling the log filter.
pub const LOG_ENV_VAR: &str = "CLUSTERART_LOG";

/// Rotated files are named `<prefix>.<YYYY-MM-DD>`.
const LOG_FILE_PREFIX: &str = "clusterart.log";

const DEFAULT_FILTER: &str = "cluster_art=info,clusterart_app=info,clusterart_source=info,warn";

/// Initialize the logging subsystem and return the log directory.
///
/// Logs are written to `~/.local/share/cluster-art/logs/`.
/// Log level is controlled by `CLUSTERART_LOG` environment variable.
///
/// # Examples
/// ```bash
/// CLUSTERART_LOG=debug clusterart --layout 7
/// CLUSTERART_LOG=clusterart_app=trace clusterart --follow
/// ```
pub fn init() -> Result<PathBuf> {
    let log_dir = log_directory();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("───── Cluster Art {} ─────", env!("CARGO_PKG_VERSION"));
    tracing::info!("Log directory: {}", log_dir.display());

    Ok(log_dir)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `<data dir>/cluster-art/logs`, or `./cluster-art/logs` without a data dir.
pub fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cluster-art")
        .join("logs")
}

/// Today's log file in `log_dir`. The appender rotates on UTC dates.
pub fn current_log_file(log_dir: &Path) -> PathBuf {
    log_dir.join(format!(
        "{}.{}",
        LOG_FILE_PREFIX,
        Utc::now().format("%Y-%m-%d")
    ))
}
