//! The viewer controller: single owner of session state.
//!
//! [`Viewer`] holds the manifest, the records of the current month, both tag
//! indexes, and the [`FilterState`]. Every mutation goes through a method
//! that finishes by pushing a fresh view to the attached [`Renderer`], so the
//! rendered output is always a pure function of the state.
//!
//! # Loading
//!
//! Fetching is left to the caller. A load is split in two:
//!
//! ```text
//! begin_load(month) ──▶ LoadTicket ──▶ (caller fetches ticket.path) ──▶ finish_load(ticket, text)
//! ```
//!
//! Each `begin_load` supersedes earlier ones. A response arriving for an
//! older ticket is discarded, so overlapping fetches cannot overwrite a newer
//! selection.

use crate::filter::{apply_filters, FilterState};
use crate::models::{Chip, Manifest, Record, TagField};
use crate::normalize::parse_dataset;
use crate::render::{Renderer, RESET_CHIP_LABEL};
use crate::tags::{unique_tags_with, TagCollator};

/// Identifies one requested dataset load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub month: String,
    pub path: String,
    generation: u64,
}

/// Session state owner driving a [`Renderer`].
pub struct Viewer<R: Renderer> {
    renderer: R,
    manifest: Manifest,
    selected_month: Option<String>,
    records: Vec<Record>,
    platform_tags: Vec<String>,
    topic_tags: Vec<String>,
    filter: FilterState,
    generation: u64,
    collator: TagCollator,
}

impl<R: Renderer> Viewer<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            manifest: Manifest::default(),
            selected_month: None,
            records: Vec::new(),
            platform_tags: Vec::new(),
            topic_tags: Vec::new(),
            filter: FilterState::default(),
            generation: 0,
            collator: TagCollator::japanese(),
        }
    }

    /// Install the manifest and render the month selector.
    pub fn set_manifest(&mut self, manifest: Manifest) {
        self.manifest = manifest;
        self.renderer
            .render_manifest(&self.manifest, self.selected_month.as_deref());
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Start loading `month`. Returns `None` if the manifest has no such month.
    pub fn begin_load(&mut self, month: &str) -> Option<LoadTicket> {
        let file = self.manifest.find(month)?;
        self.generation += 1;
        Some(LoadTicket {
            month: file.month.clone(),
            path: file.path.clone(),
            generation: self.generation,
        })
    }

    /// Start loading the manifest's default month.
    pub fn begin_default_load(&mut self) -> Option<LoadTicket> {
        let month = self.manifest.default_file()?.month.clone();
        self.begin_load(&month)
    }

    /// True if `ticket` is still the most recent load request.
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Apply fetched dataset text for `ticket`.
    ///
    /// Returns `false` and leaves the state untouched when a newer load has
    /// been started since. Otherwise replaces the records, rebuilds both tag
    /// indexes, clears the active tag selections (the query is kept), and
    /// re-renders everything.
    pub fn finish_load(&mut self, ticket: &LoadTicket, text: &str) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        self.records = parse_dataset(text);
        self.platform_tags = unique_tags_with(&self.records, TagField::Platform, &self.collator);
        self.topic_tags = unique_tags_with(&self.records, TagField::Topic, &self.collator);
        self.filter.active_platforms.clear();
        self.filter.active_topics.clear();
        self.selected_month = Some(ticket.month.clone());

        self.renderer
            .render_manifest(&self.manifest, self.selected_month.as_deref());
        self.refresh();
        true
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.filter.query = query.into();
        self.refresh();
    }

    /// Flip one chip of `field`.
    pub fn toggle(&mut self, field: TagField, value: &str) {
        self.filter.toggle(field, value);
        self.refresh();
    }

    /// The "all" chip of `field`: clear its active set.
    pub fn reset(&mut self, field: TagField) {
        self.filter.active_mut(field).clear();
        self.refresh();
    }

    /// Clear both tag groups and the query.
    pub fn clear_filters(&mut self) {
        self.filter = FilterState::default();
        self.refresh();
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn selected_month(&self) -> Option<&str> {
        self.selected_month.as_deref()
    }

    /// Tag index for `field` of the current dataset.
    pub fn tags(&self, field: TagField) -> &[String] {
        match field {
            TagField::Platform => &self.platform_tags,
            TagField::Topic => &self.topic_tags,
        }
    }

    /// Records passing the current filter, in display order.
    pub fn visible(&self) -> Vec<&Record> {
        apply_filters(&self.filter, &self.records)
    }

    /// Chips for `field`: the reset chip followed by one chip per tag.
    pub fn chips(&self, field: TagField) -> Vec<Chip> {
        let active = self.filter.active(field);
        let mut chips = Vec::with_capacity(self.tags(field).len() + 1);
        chips.push(Chip {
            label: RESET_CHIP_LABEL.to_string(),
            value: None,
            active: active.is_empty(),
        });
        chips.extend(self.tags(field).iter().map(|tag| Chip {
            label: tag.clone(),
            value: Some(tag.clone()),
            active: active.contains(tag),
        }));
        chips
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Re-render chip states and cards from the current state.
    pub fn refresh(&mut self) {
        for field in TagField::ALL {
            let chips = self.chips(field);
            self.renderer.render_chips(field, &chips);
        }
        let visible = apply_filters(&self.filter, &self.records);
        self.renderer.render_cards(&visible);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ManifestFile;

    /// Records what the viewer pushed, in the form the tests care about.
    #[derive(Default)]
    struct Recording {
        months: Vec<Option<String>>,
        chips: Vec<(TagField, Vec<Chip>)>,
        cards: Vec<Vec<String>>,
    }

    impl Renderer for Recording {
        fn render_manifest(&mut self, _manifest: &Manifest, selected: Option<&str>) {
            self.months.push(selected.map(str::to_string));
        }

        fn render_chips(&mut self, field: TagField, chips: &[Chip]) {
            self.chips.push((field, chips.to_vec()));
        }

        fn render_cards(&mut self, records: &[&Record]) {
            self.cards
                .push(records.iter().map(|r| r.name.clone()).collect());
        }
    }

    const JANUARY: &str = "日時,名称,PF,トピック,起源,背景,影響
2024-01-10,Alpha,\"PS5,PC\",発表,o,b,i
2024-01-20,Beta,PC,発売,o,b,i
2024-01-05,Gamma,Switch,\"発表,更新\",o,b,i
";

    const FEBRUARY: &str = "日時,名称,PF,トピック,起源,背景,影響
2024-02-01,Delta,Xbox,発売,o,b,i
";

    fn manifest() -> Manifest {
        Manifest {
            updated: "2024-03-01".to_string(),
            default_month: "2024-01".to_string(),
            files: vec![
                ManifestFile {
                    month: "2024-02".to_string(),
                    path: "data/2024-02.csv".to_string(),
                },
                ManifestFile {
                    month: "2024-01".to_string(),
                    path: "data/2024-01.csv".to_string(),
                },
            ],
        }
    }

    fn loaded() -> Viewer<Recording> {
        let mut viewer = Viewer::new(Recording::default());
        viewer.set_manifest(manifest());
        let ticket = viewer.begin_default_load().unwrap();
        assert_eq!(ticket.path, "data/2024-01.csv");
        assert!(viewer.finish_load(&ticket, JANUARY));
        viewer
    }

    fn last_cards(viewer: &Viewer<Recording>) -> Vec<String> {
        viewer.renderer().cards.last().cloned().unwrap()
    }

    #[test]
    fn test_load_renders_sorted_cards_and_tags() {
        let viewer = loaded();
        assert_eq!(last_cards(&viewer), vec!["Beta", "Alpha", "Gamma"]);
        assert_eq!(viewer.tags(TagField::Platform), ["PC", "PS5", "Switch"]);
        assert_eq!(viewer.selected_month(), Some("2024-01"));
        assert_eq!(
            viewer.renderer().months.last().cloned().flatten().as_deref(),
            Some("2024-01")
        );
    }

    #[test]
    fn test_reset_chip_active_when_nothing_selected() {
        let mut viewer = loaded();
        let chips = viewer.chips(TagField::Platform);
        assert_eq!(chips[0].value, None);
        assert!(chips[0].active);
        assert!(chips[1..].iter().all(|c| !c.active));

        viewer.toggle(TagField::Platform, "PC");
        let chips = viewer.chips(TagField::Platform);
        assert!(!chips[0].active);
        assert!(chips.iter().any(|c| c.value.as_deref() == Some("PC") && c.active));
    }

    #[test]
    fn test_every_setter_rerenders() {
        let mut viewer = loaded();
        let before = viewer.renderer().cards.len();

        viewer.toggle(TagField::Platform, "PC");
        assert_eq!(last_cards(&viewer), vec!["Beta", "Alpha"]);

        viewer.set_query("gamma");
        assert!(last_cards(&viewer).is_empty());

        viewer.reset(TagField::Platform);
        assert_eq!(last_cards(&viewer), vec!["Gamma"]);

        viewer.clear_filters();
        assert_eq!(last_cards(&viewer), vec!["Beta", "Alpha", "Gamma"]);
        assert_eq!(viewer.renderer().cards.len(), before + 4);
    }

    #[test]
    fn test_new_month_clears_tags_keeps_query() {
        let mut viewer = loaded();
        viewer.toggle(TagField::Topic, "発表");
        viewer.set_query("a");

        let ticket = viewer.begin_load("2024-02").unwrap();
        assert!(viewer.finish_load(&ticket, FEBRUARY));
        assert!(viewer.filter().active_topics.is_empty());
        assert_eq!(viewer.filter().query, "a");
        assert_eq!(last_cards(&viewer), vec!["Delta"]);
        assert_eq!(viewer.tags(TagField::Platform), ["Xbox"]);
    }

    #[test]
    fn test_stale_load_discarded() {
        let mut viewer = loaded();
        let slow = viewer.begin_load("2024-02").unwrap();
        let fast = viewer.begin_load("2024-01").unwrap();

        assert!(viewer.finish_load(&fast, JANUARY));
        let renders = viewer.renderer().cards.len();

        assert!(!viewer.is_current(&slow));
        assert!(!viewer.finish_load(&slow, FEBRUARY));
        assert_eq!(viewer.selected_month(), Some("2024-01"));
        assert_eq!(viewer.records().len(), 3);
        assert_eq!(viewer.renderer().cards.len(), renders);
    }

    #[test]
    fn test_unknown_month_has_no_ticket() {
        let mut viewer = loaded();
        assert!(viewer.begin_load("1999-12").is_none());
    }

    #[test]
    fn test_empty_manifest_has_no_default() {
        let mut viewer = Viewer::new(Recording::default());
        viewer.set_manifest(Manifest::default());
        assert!(viewer.begin_default_load().is_none());
        assert!(viewer.visible().is_empty());
    }
}
