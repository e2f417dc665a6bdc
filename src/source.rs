//! Data sources for the manifest and monthly dataset files.
//!
//! A [`DataSource`] resolves relative paths (as written in the manifest)
//! against a root and returns the file text. Two implementations exist:
//!
//! | Source | Root | Transport |
//! |--------|------|-----------|
//! | [`DirSource`] | local directory | `tokio::fs` |
//! | [`HttpSource`] | `http(s)://` base URL | `reqwest` |
//!
//! Paths are always relative to the root: a leading `/` is ignored by both
//! sources, so `/data/2024-02.csv` and `data/2024-02.csv` name the same file.
//! Text is decoded as UTF-8 with invalid bytes replaced, so one bad byte
//! costs a character rather than the whole month.
//!
//! Failures are not retried; they propagate to the caller with the
//! offending path or URL attached.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use digest_viewer_core::models::Manifest;

/// Fetches text files relative to a data root.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Human-readable description of the root, for logs and errors.
    fn describe(&self) -> String;

    /// Fetch the file at `path` (relative to the root) as text.
    async fn fetch_text(&self, path: &str) -> Result<String>;

    /// Fetch and decode the manifest JSON.
    async fn fetch_manifest(&self, path: &str) -> Result<Manifest> {
        let text = self.fetch_text(path).await?;
        Manifest::from_json(&text)
            .with_context(|| format!("Invalid manifest JSON: {} ({})", path, self.describe()))
    }
}

/// Reads files from a local directory.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DataSource for DirSource {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    async fn fetch_text(&self, path: &str) -> Result<String> {
        let full = self.root.join(path.trim_start_matches('/'));
        debug!(path = %full.display(), "reading file");
        let bytes = tokio::fs::read(&full)
            .await
            .with_context(|| format!("Failed to read {}", full.display()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Fetches files over HTTP(S) relative to a base URL.
pub struct HttpSource {
    base: Url,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base: &str, timeout: Duration) -> Result<Self> {
        // Url::join drops the last segment unless the base ends in '/'
        let base = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };
        let base = Url::parse(&base).with_context(|| format!("Invalid data root URL: {}", base))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { base, client })
    }

    pub fn resolve(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("Invalid path {} for base {}", path, self.base))
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn describe(&self) -> String {
        self.base.to_string()
    }

    async fn fetch_text(&self, path: &str) -> Result<String> {
        let url = self.resolve(path)?;
        debug!(%url, "fetching");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Request failed: {}", url))?
            .error_for_status()
            .with_context(|| format!("Bad response from {}", url))?;
        response
            .text()
            .await
            .with_context(|| format!("Failed to read body from {}", url))
    }
}

/// Build the data source described by `[data]`.
pub fn open_source(config: &Config) -> Result<Arc<dyn DataSource>> {
    if config.data.is_remote() {
        let source = HttpSource::new(
            &config.data.root,
            Duration::from_secs(config.data.timeout_secs),
        )?;
        Ok(Arc::new(source))
    } else {
        Ok(Arc::new(DirSource::new(&config.data.root)))
    }
}
