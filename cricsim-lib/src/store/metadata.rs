use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::record::PlayerRecord;

/// Records in index order: position `i` here is row `i` of the paired index.
///
/// A case-folded name lookup table is built once on construction. The first
/// record carrying a name wins, as a linear scan would.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<PlayerRecord>", into = "Vec<PlayerRecord>")]
pub struct MetadataStore {
    records: Vec<PlayerRecord>,
    by_name: HashMap<String, usize>,
}

impl MetadataStore {
    #[must_use]
    pub fn new(records: Vec<PlayerRecord>) -> Self {
        let mut by_name = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            by_name
                .entry(fold_name(record.known_as().unwrap_or_default()))
                .or_insert(position);
        }
        Self { records, by_name }
    }

    /// Find the first record whose `known_as` equals `name`, ignoring case.
    ///
    /// This is an exact whole-name match, not a substring search.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<(usize, &PlayerRecord)> {
        let position = *self.by_name.get(&fold_name(name))?;
        self.records.get(position).map(|record| (position, record))
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&PlayerRecord> {
        self.records.get(position)
    }

    #[must_use]
    pub fn records(&self) -> &[PlayerRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<PlayerRecord>> for MetadataStore {
    fn from(records: Vec<PlayerRecord>) -> Self {
        Self::new(records)
    }
}

impl From<MetadataStore> for Vec<PlayerRecord> {
    fn from(store: MetadataStore) -> Self {
        store.records
    }
}

fn fold_name(name: &str) -> String {
    name.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, runs: &str) -> PlayerRecord {
        [("known_as", name), ("runs", runs)].into_iter().collect()
    }

    #[test]
    fn test_find_ignores_case() {
        let store = MetadataStore::new(vec![named("Virat Kohli", "1"), named("Babar Azam", "2")]);

        let (position, record) = store.find_by_name("BABAR AZAM").unwrap();
        assert_eq!(position, 1);
        assert_eq!(record.known_as(), Some("Babar Azam"));
        assert_eq!(store.find_by_name("virat kohli").unwrap().0, 0);
    }

    #[test]
    fn test_find_is_exact_not_substring() {
        let store = MetadataStore::new(vec![named("Virat Kohli", "1")]);
        assert!(store.find_by_name("Kohli").is_none());
        assert!(store.find_by_name("Virat Kohli ").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let store = MetadataStore::new(vec![named("A", "1"), named("a", "2")]);
        let (position, record) = store.find_by_name("A").unwrap();
        assert_eq!(position, 0);
        assert_eq!(record.get("runs").unwrap().as_text(), Some("1"));
    }

    #[test]
    fn test_nameless_record_indexed_under_empty_name() {
        let nameless: PlayerRecord = [("runs", "5")].into_iter().collect();
        let store = MetadataStore::new(vec![named("A", "1"), nameless]);
        assert_eq!(store.find_by_name("").unwrap().0, 1);
    }

    #[test]
    fn test_serde_roundtrip_rebuilds_lookup() {
        let store = MetadataStore::new(vec![named("A", "1"), named("B", "2")]);
        let json = serde_json::to_string(&store).unwrap();
        assert!(json.starts_with('['));

        let loaded: MetadataStore = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.find_by_name("b").unwrap().0, 1);
    }
}
