//! Presentation capability and the HTML implementation.
//!
//! The [`Renderer`] trait is the only surface the [`Viewer`](crate::viewer::Viewer)
//! talks to: it renders the month selector, a group of toggleable chips, and
//! the list of record cards. Terminal, HTML, and test renderers all plug in
//! here without the pipeline knowing which one is attached.
//!
//! Every piece of user text that reaches markup goes through [`escape_html`].

use crate::filter::FilterState;
use crate::models::{Chip, Manifest, Record, TagField};
use crate::normalize::{BACKGROUND_LABEL, IMPACT_LABEL, ORIGIN_LABEL};

/// Label of the chip that clears a tag group.
pub const RESET_CHIP_LABEL: &str = "すべて";

/// Receives view updates from the [`Viewer`](crate::viewer::Viewer).
///
/// Each call replaces whatever the renderer previously showed for that
/// region, mirroring a container whose contents are rebuilt.
pub trait Renderer {
    /// Month selector and "last updated" label. `selected` is the month label.
    fn render_manifest(&mut self, _manifest: &Manifest, _selected: Option<&str>) {}

    /// Chip group for one tag field, reset chip first.
    fn render_chips(&mut self, field: TagField, chips: &[Chip]);

    /// The visible records; the record count is `records.len()`.
    fn render_cards(&mut self, records: &[&Record]);
}

/// Escape `& < > " '` for safe insertion into element text or attribute values.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Builds HTML fragments and, on request, a complete page.
///
/// Chips are rendered as submit buttons of a single GET form, so the page
/// works without scripts: `toggle_platform=<v>`, `toggle_topic=<v>` and
/// `reset=<scope>` describe the click, and hidden `platform`/`topic` inputs
/// carry the current selection.
#[derive(Debug, Default, Clone)]
pub struct HtmlRenderer {
    updated: String,
    selected_month: Option<String>,
    month_options: String,
    platform_chips: String,
    topic_chips: String,
    cards: String,
    count: usize,
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chips_html(&self, field: TagField) -> &str {
        match field {
            TagField::Platform => &self.platform_chips,
            TagField::Topic => &self.topic_chips,
        }
    }

    pub fn cards_html(&self) -> &str {
        &self.cards
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Assemble the full document around the rendered fragments.
    pub fn into_page(self, filter: &FilterState) -> String {
        let mut hidden = String::new();
        if let Some(month) = &self.selected_month {
            hidden.push_str(&format!(
                "<input type=\"hidden\" name=\"loaded\" value=\"{}\">",
                escape_html(month)
            ));
        }
        for field in TagField::ALL {
            for value in filter.active(field) {
                hidden.push_str(&format!(
                    "<input type=\"hidden\" name=\"{}\" value=\"{}\">",
                    field.scope(),
                    escape_html(value)
                ));
            }
        }

        format!(
            r#"<!doctype html>
<html lang="ja">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Digest Viewer</title>
<style>{style}</style>
</head>
<body>
<header>
<h1>Digest Viewer</h1>
<p id="last-updated">Updated: {updated}</p>
</header>
<form method="get" action="/" class="controls">
<button type="submit" class="default-submit" tabindex="-1" aria-hidden="true">Search</button>
{hidden}
<select id="monthSelect" name="month" onchange="this.form.submit()">{months}</select>
<input id="searchInput" type="search" name="q" value="{query}" placeholder="Search">
<div id="platformFilters" class="chips">{platforms}</div>
<div id="topicFilters" class="chips">{topics}</div>
</form>
<p id="record-count">Records: {count}</p>
<section id="cardList">{cards}</section>
</body>
</html>
"#,
            style = PAGE_STYLE,
            updated = self.updated,
            hidden = hidden,
            months = self.month_options,
            query = escape_html(&filter.query),
            platforms = self.platform_chips,
            topics = self.topic_chips,
            count = self.count,
            cards = self.cards,
        )
    }
}

impl Renderer for HtmlRenderer {
    fn render_manifest(&mut self, manifest: &Manifest, selected: Option<&str>) {
        self.updated = escape_html(&manifest.updated);
        self.selected_month = selected.map(str::to_string);
        self.month_options = manifest
            .files
            .iter()
            .map(|file| {
                let marker = if Some(file.month.as_str()) == selected {
                    " selected"
                } else {
                    ""
                };
                let month = escape_html(&file.month);
                format!("<option value=\"{}\"{}>{}</option>", month, marker, month)
            })
            .collect();
    }

    fn render_chips(&mut self, field: TagField, chips: &[Chip]) {
        let scope = field.scope();
        let html: String = chips
            .iter()
            .map(|chip| {
                let class = if chip.active { "chip is-active" } else { "chip" };
                match &chip.value {
                    None => format!(
                        "<button type=\"submit\" class=\"{}\" name=\"reset\" value=\"{}\" data-scope=\"{}\">{}</button>",
                        class,
                        scope,
                        scope,
                        escape_html(&chip.label)
                    ),
                    Some(value) => format!(
                        "<button type=\"submit\" class=\"{}\" name=\"toggle_{}\" value=\"{}\" data-scope=\"{}\" data-value=\"{}\">{}</button>",
                        class,
                        scope,
                        escape_html(value),
                        scope,
                        escape_html(value),
                        escape_html(&chip.label)
                    ),
                }
            })
            .collect();

        match field {
            TagField::Platform => self.platform_chips = html,
            TagField::Topic => self.topic_chips = html,
        }
    }

    fn render_cards(&mut self, records: &[&Record]) {
        self.cards = records.iter().map(|record| card_html(record)).collect();
        self.count = records.len();
    }
}

fn card_html(record: &Record) -> String {
    let platforms: String = record
        .platforms
        .iter()
        .map(|pf| format!("<span class=\"tag\">{}</span>", escape_html(pf)))
        .collect();
    let topics: String = record
        .topics
        .iter()
        .map(|topic| format!("<span class=\"tag topic\">{}</span>", escape_html(topic)))
        .collect();

    format!(
        "<article class=\"card\">\
<div class=\"date\">{}</div>\
<h3>{}</h3>\
<div class=\"tag-row\">{}</div>\
<div class=\"tag-row\">{}</div>\
<p><span class=\"label\">{}</span> {}</p>\
<p><span class=\"label\">{}</span> {}</p>\
<p><span class=\"label\">{}</span> {}</p>\
</article>",
        escape_html(&record.date),
        escape_html(&record.name),
        platforms,
        topics,
        ORIGIN_LABEL,
        escape_html(&record.origin),
        BACKGROUND_LABEL,
        escape_html(&record.background),
        IMPACT_LABEL,
        escape_html(&record.impact),
    )
}

const PAGE_STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0 auto;max-width:960px;padding:1rem;}\
.controls{display:flex;flex-direction:column;gap:.5rem;}\
.default-submit{position:absolute;left:-9999px;}\
.chips{display:flex;flex-wrap:wrap;gap:.25rem;}\
.chip{border:1px solid #999;border-radius:999px;background:#fff;padding:.2rem .7rem;cursor:pointer;}\
.chip.is-active{background:#333;color:#fff;}\
.card{border:1px solid #ddd;border-radius:8px;padding:.75rem;margin:.5rem 0;}\
.date{color:#666;font-size:.85rem;}\
.tag{display:inline-block;background:#eef;border-radius:4px;padding:0 .4rem;margin-right:.25rem;font-size:.8rem;}\
.tag.topic{background:#efe;}\
.label{font-weight:bold;margin-right:.25rem;}";
