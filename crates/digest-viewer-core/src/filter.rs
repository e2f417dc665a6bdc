//! Filter engine combining a free-text query with tag selections.
//!
//! A record is visible when all three criteria hold:
//!
//! 1. The trimmed, lower-cased query is empty or occurs in the lower-cased
//!    concatenation of name, origin, background and impact.
//! 2. No platform is active, or the record carries at least one active platform.
//! 3. No topic is active, or the record carries at least one active topic.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::{Record, TagField};

/// User-controlled filter inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub query: String,
    pub active_platforms: BTreeSet<String>,
    pub active_topics: BTreeSet<String>,
}

impl FilterState {
    pub fn active(&self, field: TagField) -> &BTreeSet<String> {
        match field {
            TagField::Platform => &self.active_platforms,
            TagField::Topic => &self.active_topics,
        }
    }

    pub fn active_mut(&mut self, field: TagField) -> &mut BTreeSet<String> {
        match field {
            TagField::Platform => &mut self.active_platforms,
            TagField::Topic => &mut self.active_topics,
        }
    }

    /// Flip membership of `value` in the active set for `field`.
    pub fn toggle(&mut self, field: TagField, value: &str) {
        let set = self.active_mut(field);
        if !set.remove(value) {
            set.insert(value.to_string());
        }
    }

    /// True when no criterion restricts the result.
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty()
            && self.active_platforms.is_empty()
            && self.active_topics.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.matcher().matches(record)
    }

    fn matcher(&self) -> Matcher<'_> {
        Matcher {
            query: self.query.trim().to_lowercase(),
            state: self,
        }
    }
}

/// Filter state with the query pre-normalized for a pass over many records.
struct Matcher<'a> {
    query: String,
    state: &'a FilterState,
}

impl Matcher<'_> {
    fn matches(&self, record: &Record) -> bool {
        self.matches_query(record)
            && matches_tags(record.tags(TagField::Platform), &self.state.active_platforms)
            && matches_tags(record.tags(TagField::Topic), &self.state.active_topics)
    }

    fn matches_query(&self, record: &Record) -> bool {
        if self.query.is_empty() {
            return true;
        }
        let haystack = [
            record.name.as_str(),
            record.origin.as_str(),
            record.background.as_str(),
            record.impact.as_str(),
        ]
        .join(" ")
        .to_lowercase();
        haystack.contains(&self.query)
    }
}

fn matches_tags(tags: &[String], active: &BTreeSet<String>) -> bool {
    active.is_empty() || tags.iter().any(|tag| active.contains(tag))
}

/// Return the records satisfying `state`, preserving input order.
pub fn apply_filters<'r>(state: &FilterState, records: &'r [Record]) -> Vec<&'r Record> {
    let matcher = state.matcher();
    records.iter().filter(|r| matcher.matches(r)).collect()
}
