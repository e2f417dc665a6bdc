//! Plain-text renderer for the terminal.

use digest_viewer_core::models::{Chip, Manifest, Record, TagField};
use digest_viewer_core::normalize::{
    BACKGROUND_LABEL, IMPACT_LABEL, ORIGIN_LABEL, PLATFORM_LABEL, TOPIC_LABEL,
};
use digest_viewer_core::render::Renderer;

/// Keeps the latest rendered regions as text; callers decide when to print.
#[derive(Debug, Default, Clone)]
pub struct TextRenderer {
    header: String,
    platform_chips: String,
    topic_chips: String,
    cards: String,
    count: usize,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// "Updated" label and month list, selected month in brackets.
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn chips_line(&self, field: TagField) -> &str {
        match field {
            TagField::Platform => &self.platform_chips,
            TagField::Topic => &self.topic_chips,
        }
    }

    pub fn cards(&self) -> &str {
        &self.cards
    }

    pub fn count_line(&self) -> String {
        format!("Records: {}", self.count)
    }
}

impl Renderer for TextRenderer {
    fn render_manifest(&mut self, manifest: &Manifest, selected: Option<&str>) {
        let months: Vec<String> = manifest
            .files
            .iter()
            .map(|file| {
                if Some(file.month.as_str()) == selected {
                    format!("[{}]", file.month)
                } else {
                    file.month.clone()
                }
            })
            .collect();
        self.header = format!("Updated: {}\nMonths: {}", manifest.updated, months.join(" "));
    }

    fn render_chips(&mut self, field: TagField, chips: &[Chip]) {
        let items: Vec<String> = chips
            .iter()
            .map(|chip| {
                if chip.active {
                    format!("[{}]", chip.label)
                } else {
                    chip.label.clone()
                }
            })
            .collect();
        let line = format!("{}: {}", field, items.join(" "));
        match field {
            TagField::Platform => self.platform_chips = line,
            TagField::Topic => self.topic_chips = line,
        }
    }

    fn render_cards(&mut self, records: &[&Record]) {
        self.cards = records
            .iter()
            .map(|record| card_text(record))
            .collect::<Vec<_>>()
            .join("\n");
        self.count = records.len();
    }
}

fn card_text(record: &Record) -> String {
    format!(
        "{}  {}\n  {}: {}\n  {}: {}\n  {}: {}\n  {}: {}\n  {}: {}\n",
        record.date,
        record.name,
        PLATFORM_LABEL,
        record.platforms.join(", "),
        TOPIC_LABEL,
        record.topics.join(", "),
        ORIGIN_LABEL,
        record.origin,
        BACKGROUND_LABEL,
        record.background,
        IMPACT_LABEL,
        record.impact,
    )
}
