//! Cluster Art - cluster occupancy art, headless
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use tracing::{debug, info};

use cluster_art::{run_headless, HeadlessOptions, SnapshotOrigin};
use clusterart_app::config;

/// Cluster Art - lay out and color a cluster snapshot, print it as JSON
#[derive(Parser, Debug)]
#[command(name = "clusterart")]
#[command(about = "Lay out and color cluster CPU/GPU occupancy", long_about = None)]
struct Args {
    /// Caching backend base URL (default from config)
    #[arg(long, conflicts_with_all = ["cache_dir", "file"])]
    url: Option<String>,

    /// Read snapshots straight from the backend's cache folder
    #[arg(long, value_name = "DIR", conflicts_with = "file")]
    cache_dir: Option<PathBuf>,

    /// Render a single snapshot file (plain or gzipped JSON)
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Layout mode, 1-9
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=9))]
    layout: Option<u8>,

    /// Color mode, 1-9
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=9))]
    color: Option<u8>,

    /// Grid width in cells
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100_000))]
    width: Option<u32>,

    /// Grid height in cells
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100_000))]
    height: Option<u32>,

    /// Show the snapshot nearest this time (unix seconds or RFC 3339)
    #[arg(long)]
    at: Option<String>,

    /// Restore a session URL hash (e.g. "#layout=2&color=8&ts=1700000000")
    #[arg(long, value_name = "HASH")]
    hash: Option<String>,

    /// Keep running and print a frame for every refresh
    #[arg(long)]
    follow: bool,

    /// Config file (default: <config dir>/cluster-art/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let log_dir = clusterart_core::logging::init()?;

    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => config::load_settings(path),
        None => config::load_default_settings(),
    };

    let origin = if let Some(path) = args.file {
        Some(SnapshotOrigin::File(path))
    } else if let Some(dir) = args.cache_dir {
        Some(SnapshotOrigin::CacheDir(dir))
    } else {
        args.url.map(SnapshotOrigin::Http)
    };

    let grid = match (args.width, args.height) {
        (None, None) => None,
        (w, h) => Some((
            w.unwrap_or(settings.view.grid_width),
            h.unwrap_or(settings.view.grid_height),
        )),
    };

    let options = HeadlessOptions {
        origin,
        layout: args.layout,
        color: args.color,
        grid,
        at: args.at,
        hash: args.hash,
        follow: args.follow,
    };

    debug!("Options: {:?}", options);
    run_headless(settings, options).await.wrap_err_with(|| {
        format!(
            "see {} for details",
            clusterart_core::logging::current_log_file(&log_dir).display()
        )
    })?;
    info!("Done");
    Ok(())
}
