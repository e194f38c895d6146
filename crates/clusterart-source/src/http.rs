//! HTTP snapshot source for the caching backend.
//!
//! Endpoints, relative to the configured base URL:
//! - `GET api/cluster-status` - latest snapshot
//! - `GET api/cluster-status?timestamp=<unix>` - historical snapshot
//! - `GET api/timepoints?start=<unix>&end=<unix>` - timepoint index
//!
//! Any non-2xx status is reported as [`Error::HttpStatus`]; connection and
//! decode failures as [`Error::Transport`]. Nothing here retries: the caller
//! decides whether a failure matters.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use clusterart_core::prelude::*;
use clusterart_core::{Snapshot, TimeWindow, TimepointIndex};

use crate::source::SnapshotSource;

const STATUS_PATH: &str = "api/cluster-status";
const TIMEPOINTS_PATH: &str = "api/timepoints";

/// Snapshot source backed by the backend's REST API.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    base_url: Url,
}

impl HttpSource {
    /// Create a source for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| Error::config(format!("Invalid base URL '{}': {}", base_url, e)))?;
        // Url::join replaces the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cluster-art/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::transport(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the live snapshot, or the historical one when `timestamp` is set.
    pub fn status_url(&self, timestamp: Option<i64>) -> Result<Url> {
        let mut url = self.endpoint(STATUS_PATH)?;
        if let Some(ts) = timestamp {
            url.query_pairs_mut()
                .append_pair("timestamp", &ts.to_string());
        }
        Ok(url)
    }

    pub fn timepoints_url(&self, window: TimeWindow) -> Result<Url> {
        let mut url = self.endpoint(TIMEPOINTS_PATH)?;
        url.query_pairs_mut()
            .append_pair("start", &window.start.to_string())
            .append_pair("end", &window.end.to_string());
        Ok(url)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::config(format!("Invalid endpoint '{}': {}", path, e)))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::http_status(response.status().as_u16(), url.as_str()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::transport(format!("Failed to decode {}: {}", url, e)))
    }
}

impl SnapshotSource for HttpSource {
    async fn fetch_live(&self) -> Result<Snapshot> {
        let url = self.status_url(None)?;
        self.get_json(url).await
    }

    async fn fetch_at(&self, timestamp: i64) -> Result<Snapshot> {
        let url = self.status_url(Some(timestamp))?;
        self.get_json(url).await
    }

    async fn fetch_timepoints(&self, window: TimeWindow) -> Result<TimepointIndex> {
        let url = self.timepoints_url(window)?;
        let index: TimepointIndex = self.get_json(url).await?;
        // The backend sorts, but the controller relies on it, so make sure.
        Ok(TimepointIndex::from_unsorted(
            index.timestamps,
            index.earliest,
            index.latest,
        ))
    }
}
