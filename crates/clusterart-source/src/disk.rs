//! On-disk snapshot source reading the fetcher's cache folder.
//!
//! The fetcher writes one file per capture, named by unix timestamp and
//! bucketed by UTC date:
//!
//! ```text
//! <cache>/YYYYMM/DD/<unix>.json.gz
//! ```
//!
//! Older deployments wrote flat files (`<cache>/<unix>.json.gz` or `.json`)
//! straight into the cache folder. Both layouts are read; gzip is detected
//! from the magic bytes rather than the extension.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;

use clusterart_core::prelude::*;
use clusterart_core::{Snapshot, TimeWindow, TimepointIndex};

use crate::source::SnapshotSource;

const GZIP_EXT: &str = ".json.gz";
const JSON_EXT: &str = ".json";
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Hierarchical cache path for `timestamp`: `<folder>/YYYYMM/DD/<ts><ext>`.
///
/// Always bucketed in UTC so paths do not depend on the host timezone.
pub fn cache_path_for_timestamp(timestamp: i64, folder: &Path, extension: &str) -> PathBuf {
    let dt = DateTime::<Utc>::from_timestamp(timestamp, 0).unwrap_or_default();
    folder
        .join(dt.format("%Y%m").to_string())
        .join(dt.format("%d").to_string())
        .join(format!("{}{}", timestamp, extension))
}

/// Extract the unix timestamp from a cache file name (`1700000000.json.gz`).
pub fn timestamp_from_path(path: &Path) -> Option<i64> {
    let name = path.file_name()?.to_str()?;
    let stem = name
        .strip_suffix(GZIP_EXT)
        .or_else(|| name.strip_suffix(JSON_EXT))?;
    stem.parse().ok()
}

/// Decode a cache file body, gunzipping when it carries the gzip magic.
pub fn decode_snapshot(bytes: &[u8]) -> Result<Snapshot> {
    if bytes.starts_with(&GZIP_MAGIC) {
        let mut decoder = GzDecoder::new(bytes);
        let mut json = Vec::new();
        decoder.read_to_end(&mut json)?;
        Snapshot::from_slice(&json)
    } else {
        Snapshot::from_slice(bytes)
    }
}

/// All cached timestamps under `folder`, in both layouts, sorted ascending.
pub fn scan_timestamps(folder: &Path) -> Result<Vec<i64>> {
    if !folder.is_dir() {
        return Err(Error::cache_folder_missing(folder));
    }

    let mut found = Vec::new();
    collect_timestamps(folder, 0, &mut found)?;
    found.sort_unstable();
    found.dedup();
    Ok(found)
}

// Depth 0 is the cache root (flat files), 1 is YYYYMM, 2 is DD.
fn collect_timestamps(dir: &Path, depth: usize, found: &mut Vec<i64>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if depth < 2 {
                collect_timestamps(&path, depth + 1, found)?;
            }
        } else if depth == 0 || depth == 2 {
            if let Some(ts) = timestamp_from_path(&path) {
                found.push(ts);
            }
        }
    }
    Ok(())
}

/// Locate the file for `timestamp`, preferring the hierarchical gzip layout.
fn locate(folder: &Path, timestamp: i64) -> Option<PathBuf> {
    [
        cache_path_for_timestamp(timestamp, folder, GZIP_EXT),
        cache_path_for_timestamp(timestamp, folder, JSON_EXT),
        folder.join(format!("{}{}", timestamp, GZIP_EXT)),
        folder.join(format!("{}{}", timestamp, JSON_EXT)),
    ]
    .into_iter()
    .find(|p| p.is_file())
}

/// Locate, read and decode the snapshot cached for `timestamp`. Blocking.
fn read_snapshot(folder: &Path, timestamp: i64) -> Result<Snapshot> {
    let path = locate(folder, timestamp).ok_or(Error::snapshot_not_found(timestamp))?;
    debug!("Reading cached snapshot {}", path.display());
    let bytes = std::fs::read(&path).with_context(|| format!("Reading {}", path.display()))?;
    decode_snapshot(&bytes)
}

/// Snapshot source reading directly from a cache folder.
#[derive(Debug, Clone)]
pub struct DiskCacheSource {
    folder: PathBuf,
}

impl DiskCacheSource {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    async fn scan(&self) -> Result<Vec<i64>> {
        let folder = self.folder.clone();
        tokio::task::spawn_blocking(move || scan_timestamps(&folder))
            .await
            .map_err(|e| Error::transport(format!("Cache scan task failed: {}", e)))?
    }

    async fn read(&self, timestamp: i64) -> Result<Snapshot> {
        let folder = self.folder.clone();
        tokio::task::spawn_blocking(move || read_snapshot(&folder, timestamp))
            .await
            .map_err(|e| Error::transport(format!("Cache read task failed: {}", e)))?
    }
}

impl SnapshotSource for DiskCacheSource {
    async fn fetch_live(&self) -> Result<Snapshot> {
        let timestamps = self.scan().await?;
        let latest = timestamps
            .last()
            .copied()
            .ok_or_else(|| Error::transport("Cache folder holds no snapshots"))?;
        self.read(latest).await
    }

    async fn fetch_at(&self, timestamp: i64) -> Result<Snapshot> {
        self.read(timestamp).await
    }

    async fn fetch_timepoints(&self, window: TimeWindow) -> Result<TimepointIndex> {
        let all = self.scan().await?;
        let earliest = all.first().copied();
        let latest = all.last().copied();
        let timestamps = all.into_iter().filter(|t| window.contains(*t)).collect();
        Ok(TimepointIndex {
            timestamps,
            earliest,
            latest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    const BODY: &str = r#"{"hostDetails":[{"hostname":"h01u01","numCpus":2}]}"#;

    fn write_gz(path: &Path, body: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let file = std::fs::File::create(path).unwrap();
        let mut enc = GzEncoder::new(file, Compression::fast());
        enc.write_all(body.as_bytes()).unwrap();
        enc.finish().unwrap();
    }

    #[test]
    fn test_cache_path_is_utc_bucketed() {
        let p = cache_path_for_timestamp(1_700_000_000, Path::new("cache"), GZIP_EXT);
        assert_eq!(p, PathBuf::from("cache/202311/14/1700000000.json.gz"));
    }

    #[test]
    fn test_timestamp_from_path() {
        assert_eq!(
            timestamp_from_path(Path::new("cache/202311/14/1700000000.json.gz")),
            Some(1_700_000_000)
        );
        assert_eq!(timestamp_from_path(Path::new("1700000000.json")), Some(1_700_000_000));
        assert_eq!(timestamp_from_path(Path::new("notes.json")), None);
        assert_eq!(timestamp_from_path(Path::new("1700000000.txt")), None);
    }

    #[test]
    fn test_decode_plain_and_gzip() {
        let plain = decode_snapshot(BODY.as_bytes()).unwrap();
        assert_eq!(plain.host_details.len(), 1);

        let mut enc = GzEncoder::new(Vec::new(), Compression::fast());
        enc.write_all(BODY.as_bytes()).unwrap();
        let gz = enc.finish().unwrap();
        let decoded = decode_snapshot(&gz).unwrap();
        assert_eq!(decoded, plain);
    }

    #[test]
    fn test_scan_reads_both_layouts() {
        let dir = TempDir::new().unwrap();
        write_gz(&cache_path_for_timestamp(1_700_000_000, dir.path(), GZIP_EXT), BODY);
        write_gz(&cache_path_for_timestamp(1_700_000_120, dir.path(), GZIP_EXT), BODY);
        std::fs::write(dir.path().join("1600000000.json"), BODY).unwrap();
        std::fs::write(dir.path().join("README.txt"), "ignore me").unwrap();

        let found = scan_timestamps(dir.path()).unwrap();
        assert_eq!(found, vec![1_600_000_000, 1_700_000_000, 1_700_000_120]);
    }

    #[test]
    fn test_scan_missing_folder() {
        let err = scan_timestamps(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, Error::CacheFolderMissing { .. }));
    }

    #[tokio::test]
    async fn test_source_fetches_latest_and_by_timestamp() {
        let dir = TempDir::new().unwrap();
        write_gz(
            &cache_path_for_timestamp(1_700_000_000, dir.path(), GZIP_EXT),
            r#"{"hostDetails":[{"hostname":"old","numCpus":1}]}"#,
        );
        write_gz(
            &cache_path_for_timestamp(1_700_000_120, dir.path(), GZIP_EXT),
            r#"{"hostDetails":[{"hostname":"new","numCpus":1}]}"#,
        );
        let source = DiskCacheSource::new(dir.path());

        let live = source.fetch_live().await.unwrap();
        assert_eq!(live.host_details[0].hostname, "new");

        let old = source.fetch_at(1_700_000_000).await.unwrap();
        assert_eq!(old.host_details[0].hostname, "old");

        let missing = source.fetch_at(42).await.unwrap_err();
        assert!(matches!(missing, Error::SnapshotNotFound { timestamp: 42 }));
    }

    #[tokio::test]
    async fn test_source_reports_corrupt_file() {
        let dir = TempDir::new().unwrap();
        write_gz(
            &cache_path_for_timestamp(1_700_000_000, dir.path(), GZIP_EXT),
            "{not json",
        );
        let source = DiskCacheSource::new(dir.path());

        let err = source.fetch_at(1_700_000_000).await.unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_source_timepoints_filtered_by_window() {
        let dir = TempDir::new().unwrap();
        for ts in [1_000, 2_000, 3_000] {
            std::fs::write(dir.path().join(format!("{}.json", ts)), BODY).unwrap();
        }
        let source = DiskCacheSource::new(dir.path());
        let index = source
            .fetch_timepoints(TimeWindow {
                start: 1_500,
                end: 3_000,
            })
            .await
            .unwrap();
        assert_eq!(index.timestamps, vec![2_000, 3_000]);
        assert_eq!(index.earliest, Some(1_000));
        assert_eq!(index.latest, Some(3_000));
    }
}
