//! Player records as produced by the scraping pipeline
//!
//! A record is a loose mapping from statistic name to whatever value the
//! source handed us: numbers, numeric strings, annotated strings such as
//! `"120*"`, placeholders such as `"-"`, or nothing at all. Records are never
//! interpreted here; numeric policy lives in [`crate::vectorize`].
//!
//! # Usage
//!
//! ```ignore
//! use cricsim_lib::record::{PlayerRecord, StatValue};
//!
//! let record: PlayerRecord = serde_json::from_str(r#"{"known_as": "A", "runs": "120*"}"#)?;
//! assert_eq!(record.known_as(), Some("A"));
//! ```

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

mod clean;
mod format;

pub use clean::*;
pub use format::*;

/// Field holding the player's display name
pub const NAME_FIELD: &str = "known_as";

/// Field holding the match format tag
pub const FORMAT_FIELD: &str = "format";

/// A single raw statistic value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl StatValue {
    /// Returns the text content, if this is a textual value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StatValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` for values that carry no data at all.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            StatValue::Null => true,
            StatValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Null => f.write_str("-"),
            StatValue::Bool(b) => write!(f, "{b}"),
            StatValue::Number(n) => write!(f, "{n}"),
            StatValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for StatValue {
    fn from(s: &str) -> Self {
        StatValue::Text(s.to_string())
    }
}

impl From<String> for StatValue {
    fn from(s: String) -> Self {
        StatValue::Text(s)
    }
}

impl From<f64> for StatValue {
    fn from(n: f64) -> Self {
        StatValue::Number(n)
    }
}

/// One player's statistics for one match format.
///
/// Fields keep the column order of the source. Setting a key that is
/// already present replaces its value in place, so a repeated column
/// resolves to its last occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerRecord {
    fields: Vec<(String, StatValue)>,
}

impl PlayerRecord {
    /// Look up a field by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&StatValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut StatValue> {
        self.fields.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    fn insert(&mut self, key: String, value: StatValue) {
        match self.get_mut(&key) {
            Some(slot) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    /// The display name, if the record has a textual `known_as` field.
    #[must_use]
    pub fn known_as(&self) -> Option<&str> {
        self.get(NAME_FIELD).and_then(StatValue::as_text)
    }

    /// The match format tag, if present and recognised.
    #[must_use]
    pub fn format(&self) -> Option<MatchFormat> {
        self.get(FORMAT_FIELD)
            .and_then(StatValue::as_text)
            .and_then(|s| s.parse().ok())
    }

    /// Fields in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StatValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for PlayerRecord
where
    K: Into<String>,
    V: Into<StatValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::default();
        for (k, v) in iter {
            record.insert(k.into(), v.into());
        }
        record
    }
}

impl Serialize for PlayerRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PlayerRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = PlayerRecord;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of statistic names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut record = PlayerRecord::default();
                while let Some((key, value)) = access.next_entry::<String, StatValue>()? {
                    record.insert(key, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}
