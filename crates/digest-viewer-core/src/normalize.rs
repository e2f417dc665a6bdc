//! Maps tokenized rows to [`Record`]s.
//!
//! The first row is the header. Each expected column is located by its
//! label; when a label is missing the column falls back to a fixed position
//! (0 through 6 in label order). The fallback means a renamed header still
//! yields records, but a reordered file is misread without any error.

use crate::csv::tokenize;
use crate::models::Record;

pub const DATE_LABEL: &str = "日時";
pub const NAME_LABEL: &str = "名称";
pub const PLATFORM_LABEL: &str = "PF";
pub const TOPIC_LABEL: &str = "トピック";
pub const ORIGIN_LABEL: &str = "起源";
pub const BACKGROUND_LABEL: &str = "背景";
pub const IMPACT_LABEL: &str = "影響";

/// Resolved column positions for one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: usize,
    pub name: usize,
    pub platforms: usize,
    pub topics: usize,
    pub origin: usize,
    pub background: usize,
    pub impact: usize,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            date: 0,
            name: 1,
            platforms: 2,
            topics: 3,
            origin: 4,
            background: 5,
            impact: 6,
        }
    }
}

/// Resolve column positions from trimmed header cells.
pub fn resolve_columns<S: AsRef<str>>(headers: &[S]) -> ColumnMap {
    let position = |label: &str, fallback: usize| {
        headers
            .iter()
            .position(|h| h.as_ref() == label)
            .unwrap_or(fallback)
    };
    let d = ColumnMap::default();

    ColumnMap {
        date: position(DATE_LABEL, d.date),
        name: position(NAME_LABEL, d.name),
        platforms: position(PLATFORM_LABEL, d.platforms),
        topics: position(TOPIC_LABEL, d.topics),
        origin: position(ORIGIN_LABEL, d.origin),
        background: position(BACKGROUND_LABEL, d.background),
        impact: position(IMPACT_LABEL, d.impact),
    }
}

/// Split a tag cell on commas, trimming pieces and dropping empty ones.
pub fn split_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Convert tokenized rows into records sorted by date, newest first.
///
/// Dates compare as plain strings, so chronological order relies on an
/// ISO-like date format in the source.
pub fn to_records(rows: &[Vec<String>]) -> Vec<Record> {
    let Some((header, data)) = rows.split_first() else {
        return Vec::new();
    };

    let headers: Vec<&str> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let cell = if i == 0 {
                cell.trim_start_matches('\u{feff}')
            } else {
                cell.as_str()
            };
            cell.trim()
        })
        .collect();
    let columns = resolve_columns(headers.as_slice());

    let mut records: Vec<Record> = data
        .iter()
        .enumerate()
        .map(|(index, cols)| {
            let cell = |i: usize| cols.get(i).cloned().unwrap_or_default();
            let date = cell(columns.date);
            Record {
                id: format!("{}-{}", date, index),
                date,
                name: cell(columns.name),
                platforms: split_tags(&cell(columns.platforms)),
                topics: split_tags(&cell(columns.topics)),
                origin: cell(columns.origin),
                background: cell(columns.background),
                impact: cell(columns.impact),
            }
        })
        .collect();

    records.sort_by(|a, b| b.date.cmp(&a.date));
    records
}

/// Tokenize and normalize a dataset in one step.
pub fn parse_dataset(text: &str) -> Vec<Record> {
    to_records(&tokenize(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "日時,名称,PF,トピック,起源,背景,影響";

    #[test]
    fn test_short_row_yields_empty_strings() {
        let records = parse_dataset(&format!("{}\n2024-01-01,Only Name", HEADER));
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.name, "Only Name");
        assert!(r.platforms.is_empty());
        assert!(r.topics.is_empty());
        assert_eq!(r.origin, "");
        assert_eq!(r.background, "");
        assert_eq!(r.impact, "");
    }

    #[test]
    fn test_sorted_by_date_descending() {
        let text = format!(
            "{}\n2024-01-01,January,,,,,\n2024-02-01,February,,,,,",
            HEADER
        );
        let records = parse_dataset(&text);
        assert_eq!(records[0].name, "February");
        assert_eq!(records[1].name, "January");
    }

    #[test]
    fn test_equal_dates_keep_source_order() {
        let text = format!("{}\n2024-01-01,first\n2024-01-01,second", HEADER);
        let records = parse_dataset(&text);
        assert_eq!(records[0].name, "first");
        assert_eq!(records[1].name, "second");
    }

    #[test]
    fn test_ids_use_row_index() {
        let text = format!("{}\n2024-01-01,a\n2024-01-01,b\n2024-03-01,c", HEADER);
        let records = parse_dataset(&text);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2024-03-01-2", "2024-01-01-0", "2024-01-01-1"]);
    }

    #[test]
    fn test_tag_columns_split_and_trimmed() {
        let text = format!("{}\n2024-01-01,n,\"PS5, PC,,PC\",\" 発表 \",o,b,i", HEADER);
        let records = parse_dataset(&text);
        assert_eq!(records[0].platforms, vec!["PS5", "PC", "PC"]);
        assert_eq!(records[0].topics, vec!["発表"]);
    }

    #[test]
    fn test_columns_resolved_by_label() {
        let text = "名称,影響,日時\nGame,Big,2024-05-01";
        let records = parse_dataset(text);
        assert_eq!(records[0].name, "Game");
        assert_eq!(records[0].impact, "Big");
        assert_eq!(records[0].date, "2024-05-01");
    }

    #[test]
    fn test_missing_labels_fall_back_to_position() {
        let columns = resolve_columns(&["date", "title", "platform"]);
        assert_eq!(columns, ColumnMap::default());
    }

    #[test]
    fn test_renamed_header_reads_by_position() {
        let text = "date,title,pf,topic,origin,background,impact\n\
                    2024-04-01,Epsilon,PC,発表,o,b,Huge";
        let records = parse_dataset(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "2024-04-01");
        assert_eq!(records[0].name, "Epsilon");
        assert_eq!(records[0].platforms, vec!["PC"]);
        assert_eq!(records[0].impact, "Huge");
    }

    #[test]
    fn test_header_cells_trimmed_and_bom_stripped() {
        let columns = resolve_columns(&["x", "名称"]);
        assert_eq!(columns.name, 1);

        let text = "\u{feff} 名称 ,日時\nGame,2024-05-01";
        let records = parse_dataset(text);
        assert_eq!(records[0].name, "Game");
        assert_eq!(records[0].date, "2024-05-01");
    }

    #[test]
    fn test_header_only_and_empty() {
        assert!(parse_dataset(HEADER).is_empty());
        assert!(parse_dataset("").is_empty());
    }
}
