//! Fetch-then-apply helpers shared by the CLI and the HTTP server.
//!
//! Fetching is async and happens first; the [`Viewer`] is then built
//! synchronously from the fetched text. Keeping the viewer out of `.await`
//! points lets request handlers stay `Send`.

use anyhow::{anyhow, Context, Result};
use std::fmt;
use tracing::info;

use crate::source::DataSource;
use digest_viewer_core::models::{Chip, Manifest, Record, TagField};
use digest_viewer_core::render::Renderer;
use digest_viewer_core::viewer::Viewer;

/// The requested month is not listed in the manifest.
#[derive(Debug)]
pub struct UnknownMonth(pub String);

impl fmt::Display for UnknownMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "month not found in manifest: {}", self.0)
    }
}

impl std::error::Error for UnknownMonth {}

/// A manifest plus the raw text of one of its months.
#[derive(Debug, Clone)]
pub struct FetchedMonth {
    pub manifest: Manifest,
    pub month: String,
    pub text: String,
}

/// Renderer for callers that only read [`Viewer`] state (JSON output, tag
/// listings). Draws nothing.
#[derive(Debug, Default)]
pub(crate) struct StateOnly;

impl Renderer for StateOnly {
    fn render_chips(&mut self, _field: TagField, _chips: &[Chip]) {}

    fn render_cards(&mut self, _records: &[&Record]) {}
}

/// Filter inputs gathered from CLI flags or HTTP query parameters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ViewParams {
    pub month: Option<String>,
    pub loaded: Option<String>,
    pub query: String,
    pub platforms: Vec<String>,
    pub topics: Vec<String>,
    pub toggles: Vec<(TagField, String)>,
    pub resets: Vec<TagField>,
}

impl ViewParams {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = ViewParams::default();
        for (key, value) in pairs {
            match key.as_str() {
                "month" if !value.is_empty() => params.month = Some(value),
                "loaded" if !value.is_empty() => params.loaded = Some(value),
                "q" => params.query = value,
                "platform" => params.platforms.push(value),
                "topic" => params.topics.push(value),
                "toggle_platform" => params.toggles.push((TagField::Platform, value)),
                "toggle_topic" => params.toggles.push((TagField::Topic, value)),
                "reset" => {
                    if let Some(field) = TagField::from_scope(&value) {
                        params.resets.push(field);
                    }
                }
                _ => {}
            }
        }
        params
    }

    /// Replay the parameters into a freshly loaded viewer.
    pub fn apply<R: Renderer>(&self, viewer: &mut Viewer<R>) {
        viewer.set_query(self.query.clone());

        let carry = match &self.loaded {
            Some(loaded) => viewer.selected_month() == Some(loaded.as_str()),
            None => true,
        };
        if carry {
            for value in &self.platforms {
                if !viewer.filter().active_platforms.contains(value) {
                    viewer.toggle(TagField::Platform, value);
                }
            }
            for value in &self.topics {
                if !viewer.filter().active_topics.contains(value) {
                    viewer.toggle(TagField::Topic, value);
                }
            }
        }

        for (field, value) in &self.toggles {
            viewer.toggle(*field, value);
        }
        for field in &self.resets {
            viewer.reset(*field);
        }
    }
}

/// Fetch the manifest and the dataset for `month` (or the default month).
pub async fn fetch_month(
    source: &dyn DataSource,
    manifest_path: &str,
    month: Option<&str>,
) -> Result<FetchedMonth> {
    let manifest = source.fetch_manifest(manifest_path).await?;
    let file = match month {
        Some(m) => manifest
            .find(m)
            .ok_or_else(|| anyhow!(UnknownMonth(m.to_string())))?,
        None => manifest
            .default_file()
            .ok_or_else(|| anyhow!("manifest lists no files ({})", source.describe()))?,
    };
    let month = file.month.clone();

    let text = source
        .fetch_text(&file.path)
        .await
        .with_context(|| format!("Failed to load dataset for {}", month))?;
    info!(month = %month, path = %file.path, bytes = text.len(), "dataset fetched");

    Ok(FetchedMonth {
        manifest,
        month,
        text,
    })
}

/// Build a viewer with `fetched` loaded into it.
pub fn open_viewer<R: Renderer>(renderer: R, fetched: FetchedMonth) -> Result<Viewer<R>> {
    let mut viewer = Viewer::new(renderer);
    viewer.set_manifest(fetched.manifest);
    let ticket = viewer
        .begin_load(&fetched.month)
        .ok_or_else(|| anyhow!(UnknownMonth(fetched.month.clone())))?;
    viewer.finish_load(&ticket, &fetched.text);
    info!(
        month = %fetched.month,
        records = viewer.records().len(),
        "dataset loaded"
    );
    Ok(viewer)
}
