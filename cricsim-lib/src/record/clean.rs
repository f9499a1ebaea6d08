use std::collections::{BTreeMap, HashSet};
use std::fmt::Write;

use tracing::{debug, warn};

use crate::record::{MatchFormat, PlayerRecord, StatValue, FORMAT_FIELD};

/// Normalize a scraped column header: `" Bat Avg "` becomes `bat_avg`.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    key.trim().replace(' ', "_").to_lowercase()
}

/// Clean raw scraper output before indexing.
///
/// Keys are normalized, format codes mapped to display names, blank records
/// and exact duplicates dropped. Input order is otherwise preserved.
/// Statistic values are left untouched.
pub fn clean_records<I>(records: I) -> Vec<PlayerRecord>
where
    I: IntoIterator<Item = PlayerRecord>,
{
    let mut seen = HashSet::new();
    let mut cleaned = Vec::new();
    let (mut blank, mut duplicate) = (0usize, 0usize);

    for record in records {
        let record = normalize_record(record);

        if record.iter().all(|(_, v)| v.is_blank()) {
            blank += 1;
            continue;
        }

        if !seen.insert(fingerprint(&record)) {
            duplicate += 1;
            continue;
        }

        cleaned.push(record);
    }

    if blank > 0 || duplicate > 0 {
        warn!(blank, duplicate, kept = cleaned.len(), "dropped records while cleaning");
    } else {
        debug!(kept = cleaned.len(), "cleaned records");
    }

    cleaned
}

fn normalize_record(record: PlayerRecord) -> PlayerRecord {
    // a later column that normalizes onto an earlier one replaces its value
    let mut record: PlayerRecord = record
        .fields
        .into_iter()
        .map(|(k, v)| (normalize_key(&k), v))
        .collect();

    if let Some(value) = record.get_mut(FORMAT_FIELD) {
        let parsed = value.as_text().and_then(|s| s.parse::<MatchFormat>().ok());
        *value = match parsed {
            Some(format) => StatValue::Text(format.as_str().to_string()),
            None => StatValue::Null,
        };
    }

    record
}

fn fingerprint(record: &PlayerRecord) -> String {
    let mut fields: Vec<_> = record.iter().collect();
    fields.sort_by_key(|(k, _)| *k);

    let mut key = String::new();
    for (k, v) in fields {
        let _ = write!(key, "{k}\u{1f}{v:?}\u{1e}");
    }
    key
}

/// Cleaned records split by match format.
#[derive(Debug, Default)]
pub struct FormatPartition {
    pub by_format: BTreeMap<MatchFormat, Vec<PlayerRecord>>,
    /// Records without a recognised format tag
    pub unassigned: usize,
}

impl FormatPartition {
    /// Records for one format, in input order.
    #[must_use]
    pub fn records(&self, format: MatchFormat) -> &[PlayerRecord] {
        self.by_format.get(&format).map_or(&[], Vec::as_slice)
    }
}

/// Split records by their `format` tag, preserving order within each format.
pub fn partition_by_format<I>(records: I) -> FormatPartition
where
    I: IntoIterator<Item = PlayerRecord>,
{
    let mut partition = FormatPartition::default();

    for record in records {
        match record.format() {
            Some(format) => partition.by_format.entry(format).or_default().push(record),
            None => partition.unassigned += 1,
        }
    }

    if partition.unassigned > 0 {
        warn!(
            unassigned = partition.unassigned,
            "records without a recognised format will not be indexed"
        );
    }

    partition
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> PlayerRecord {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key(" Bat Avg "), "bat_avg");
        assert_eq!(normalize_key("Known As"), "known_as");
        assert_eq!(normalize_key("e/r"), "e/r");
    }

    #[test]
    fn test_format_codes_mapped() {
        let cleaned = clean_records(vec![
            record(&[("Known As", "A"), ("Format", "T")]),
            record(&[("Known As", "B"), ("Format", "O")]),
            record(&[("Known As", "C"), ("Format", "W")]),
            record(&[("Known As", "D"), ("Format", "X")]),
        ]);

        assert_eq!(cleaned[0].format(), Some(MatchFormat::Test));
        assert_eq!(cleaned[1].format(), Some(MatchFormat::Odi));
        assert_eq!(cleaned[2].format(), Some(MatchFormat::T20));
        assert_eq!(cleaned[3].get("format"), Some(&StatValue::Null));
    }

    #[test]
    fn test_blank_records_dropped() {
        let blank: PlayerRecord = [("known_as", StatValue::Null), ("runs", "  ".into())]
            .into_iter()
            .collect();
        let cleaned = clean_records(vec![blank, record(&[("known_as", "A")])]);

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned[0].known_as(), Some("A"));
    }

    #[test]
    fn test_duplicates_dropped_keeping_first() {
        let cleaned = clean_records(vec![
            record(&[("known_as", "A"), ("runs", "1")]),
            record(&[("known_as", "B"), ("runs", "2")]),
            record(&[("Known As", "A"), ("runs", "1")]),
        ]);

        let names: Vec<_> = cleaned.iter().filter_map(PlayerRecord::known_as).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_colliding_headers_keep_last_column() {
        let raw: PlayerRecord =
            serde_json::from_str(r#"{"known_as": "A", "bat_avg": "1", "Bat Avg": "2"}"#).unwrap();
        let cleaned = clean_records(vec![raw]);

        assert_eq!(cleaned[0].len(), 2);
        assert_eq!(cleaned[0].get("bat_avg"), Some(&StatValue::from("2")));
    }

    #[test]
    fn test_duplicates_ignore_column_order() {
        let cleaned = clean_records(vec![
            record(&[("known_as", "A"), ("runs", "1")]),
            record(&[("runs", "1"), ("known_as", "A")]),
        ]);

        assert_eq!(cleaned.len(), 1);
    }

    #[test]
    fn test_text_and_number_are_distinct() {
        let text = record(&[("known_as", "A"), ("runs", "1")]);
        let number: PlayerRecord = [("known_as", StatValue::from("A")), ("runs", StatValue::Number(1.0))]
            .into_iter()
            .collect();

        assert_eq!(clean_records(vec![text, number]).len(), 2);
    }

    #[test]
    fn test_partition_by_format() {
        let partition = partition_by_format(vec![
            record(&[("known_as", "A"), ("format", "ODI")]),
            record(&[("known_as", "B"), ("format", "Test")]),
            record(&[("known_as", "C"), ("format", "ODI")]),
            record(&[("known_as", "D")]),
        ]);

        let odi: Vec<_> = partition
            .records(MatchFormat::Odi)
            .iter()
            .filter_map(PlayerRecord::known_as)
            .collect();
        assert_eq!(odi, vec!["A", "C"]);
        assert_eq!(partition.records(MatchFormat::Test).len(), 1);
        assert!(partition.records(MatchFormat::T20).is_empty());
        assert_eq!(partition.unassigned, 1);
    }
}
