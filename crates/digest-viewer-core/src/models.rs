//! Core data models shared by the pipeline and every presentation surface.

use serde::{Deserialize, Serialize};

/// One normalized dataset row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// `"{date}-{row_index}"`, unique within a loaded dataset.
    pub id: String,
    pub date: String,
    pub name: String,
    pub platforms: Vec<String>,
    pub topics: Vec<String>,
    pub origin: String,
    pub background: String,
    pub impact: String,
}

impl Record {
    /// Returns the tag list selected by `field`.
    pub fn tags(&self, field: TagField) -> &[String] {
        match field {
            TagField::Platform => &self.platforms,
            TagField::Topic => &self.topics,
        }
    }
}

/// Selects one of the two tag columns of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagField {
    Platform,
    Topic,
}

impl TagField {
    pub const ALL: [TagField; 2] = [TagField::Platform, TagField::Topic];

    /// Scope name used in form fields, CLI flags and JSON.
    pub fn scope(self) -> &'static str {
        match self {
            TagField::Platform => "platform",
            TagField::Topic => "topic",
        }
    }

    pub fn from_scope(scope: &str) -> Option<TagField> {
        match scope {
            "platform" => Some(TagField::Platform),
            "topic" => Some(TagField::Topic),
            _ => None,
        }
    }
}

impl std::fmt::Display for TagField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.scope())
    }
}

/// Dataset index listing the available monthly files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub updated: String,
    #[serde(default, rename = "defaultMonth")]
    pub default_month: String,
    #[serde(default)]
    pub files: Vec<ManifestFile>,
}

/// A single month entry of the [`Manifest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFile {
    pub month: String,
    pub path: String,
}

impl Manifest {
    pub fn from_json(text: &str) -> serde_json::Result<Manifest> {
        serde_json::from_str(text)
    }

    /// Looks up the file entry for a month label.
    pub fn find(&self, month: &str) -> Option<&ManifestFile> {
        self.files.iter().find(|file| file.month == month)
    }

    /// The entry named by `defaultMonth`, falling back to the first entry.
    pub fn default_file(&self) -> Option<&ManifestFile> {
        self.find(&self.default_month).or_else(|| self.files.first())
    }
}

/// A toggleable control for one tag value, or the "all" reset control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chip {
    pub label: String,
    /// `None` for the reset chip.
    pub value: Option<String>,
    pub active: bool,
}
