//! One-shot filtering from the command line (`dv search`, `dv tags`).

use anyhow::{bail, Result};
use serde::Serialize;

use crate::config::Config;
use crate::session::{fetch_month, open_viewer, StateOnly, ViewParams};
use crate::source::open_source;
use crate::text::TextRenderer;
use digest_viewer_core::filter::FilterState;
use digest_viewer_core::models::{Record, TagField};
use digest_viewer_core::render::HtmlRenderer;

/// JSON output of `dv search --format json`.
#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub month: String,
    pub count: usize,
    pub filter: FilterState,
    pub records: Vec<Record>,
}

pub async fn run_search(
    config: &Config,
    query: Option<String>,
    month: Option<String>,
    platforms: Vec<String>,
    topics: Vec<String>,
    format: &str,
) -> Result<()> {
    match format {
        "text" | "json" | "html" => {}
        _ => bail!("Unknown output format: {}. Use text, json, or html.", format),
    }

    let params = ViewParams {
        month,
        query: query.unwrap_or_default(),
        platforms,
        topics,
        ..Default::default()
    };

    let source = open_source(config)?;
    let fetched = fetch_month(source.as_ref(), &config.data.manifest, params.month.as_deref()).await?;
    let month = fetched.month.clone();

    match format {
        "html" => {
            let mut viewer = open_viewer(HtmlRenderer::new(), fetched)?;
            params.apply(&mut viewer);
            let filter = viewer.filter().clone();
            println!("{}", viewer.into_renderer().into_page(&filter));
        }
        "json" => {
            let mut viewer = open_viewer(StateOnly, fetched)?;
            params.apply(&mut viewer);
            let records: Vec<Record> = viewer.visible().into_iter().cloned().collect();
            let output = SearchOutput {
                month,
                count: records.len(),
                filter: viewer.filter().clone(),
                records,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            let mut viewer = open_viewer(TextRenderer::new(), fetched)?;
            params.apply(&mut viewer);
            let text = viewer.renderer();
            println!("Month: {}", month);
            println!("{}", text.count_line());
            if !text.cards().is_empty() {
                println!();
                println!("{}", text.cards());
            }
        }
    }

    Ok(())
}

/// Print the tag index of a month, for one field or both.
pub async fn run_tags(config: &Config, month: Option<String>, field: Option<String>) -> Result<()> {
    let fields = match field.as_deref() {
        None => TagField::ALL.to_vec(),
        Some(scope) => match TagField::from_scope(scope) {
            Some(field) => vec![field],
            None => bail!("Unknown tag field: {}. Use platform or topic.", scope),
        },
    };

    let source = open_source(config)?;
    let fetched = fetch_month(source.as_ref(), &config.data.manifest, month.as_deref()).await?;
    let viewer = open_viewer(StateOnly, fetched)?;

    for field in fields {
        let tags = viewer.tags(field);
        println!("{} ({})", field, tags.len());
        for tag in tags {
            println!("  {}", tag);
        }
    }

    Ok(())
}
