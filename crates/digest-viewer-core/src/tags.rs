//! Distinct tag values for the chip controls.
//!
//! Values are ordered with a Japanese-locale collator so kana, kanji and
//! Latin labels sort the way a Japanese reader expects. If collation data is
//! unavailable the index falls back to plain string order.

use icu_collator::{Collator, CollatorOptions};
use icu_locid::locale;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::{Record, TagField};

/// Locale-aware string comparison used for tag ordering.
pub struct TagCollator {
    collator: Option<Collator>,
}

impl TagCollator {
    pub fn japanese() -> Self {
        let collator = Collator::try_new(&locale!("ja").into(), CollatorOptions::new()).ok();
        Self { collator }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b).then_with(|| a.cmp(b)),
            None => a.cmp(b),
        }
    }
}

impl Default for TagCollator {
    fn default() -> Self {
        Self::japanese()
    }
}

/// Collect the distinct values of `field` across `records`, collated.
pub fn unique_tags(records: &[Record], field: TagField) -> Vec<String> {
    unique_tags_with(records, field, &TagCollator::japanese())
}

/// Same as [`unique_tags`] with a caller-supplied collator, so both tag
/// groups of one load can share it.
pub fn unique_tags_with(records: &[Record], field: TagField, collator: &TagCollator) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut tags: Vec<String> = Vec::new();

    for record in records {
        for tag in record.tags(field) {
            if seen.insert(tag.as_str()) {
                tags.push(tag.clone());
            }
        }
    }

    tags.sort_by(|a, b| collator.compare(a, b));
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(platforms: &[&str], topics: &[&str]) -> Record {
        Record {
            id: String::new(),
            date: String::new(),
            name: String::new(),
            platforms: platforms.iter().map(|s| s.to_string()).collect(),
            topics: topics.iter().map(|s| s.to_string()).collect(),
            origin: String::new(),
            background: String::new(),
            impact: String::new(),
        }
    }

    #[test]
    fn test_distinct_sorted_platforms() {
        let records = vec![record(&["PS5", "PC"], &[]), record(&["PC", "Switch"], &[])];
        assert_eq!(
            unique_tags(&records, TagField::Platform),
            vec!["PC", "PS5", "Switch"]
        );
    }

    #[test]
    fn test_fields_are_independent() {
        let records = vec![record(&["PC"], &["発表"]), record(&[], &["発売", "発表"])];
        assert_eq!(unique_tags(&records, TagField::Platform), vec!["PC"]);
        assert_eq!(unique_tags(&records, TagField::Topic).len(), 2);
    }

    #[test]
    fn test_collation_is_case_aware_not_ordinal() {
        // Ordinal order would put every uppercase letter before lowercase.
        let records = vec![record(&["b", "A", "C"], &[])];
        assert_eq!(
            unique_tags(&records, TagField::Platform),
            vec!["A", "b", "C"]
        );
    }

    #[test]
    fn test_empty_records() {
        assert!(unique_tags(&[], TagField::Topic).is_empty());
    }
}
