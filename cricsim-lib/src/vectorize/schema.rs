use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Statistic columns used for player vectors, in vector order
pub const CRICKET_COLUMNS: [&str; 10] = [
    "matches", "inns", "runs", "100s", "bat_avg", "wkts", "4w", "bowl_avg", "e/r", "best",
];

/// Ordered list of statistic keys defining the layout of every feature vector.
///
/// The schema is shared by all formats; an index built under one schema can
/// only be queried with vectors produced under the same one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VectorSchema {
    keys: Vec<String>,
}

impl VectorSchema {
    /// Build a schema from an ordered list of keys. Empty schemas are rejected.
    pub fn new<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(Error::InvalidInput("vector schema must name at least one statistic".into()));
        }
        Ok(Self { keys })
    }

    /// The default batting and bowling schema.
    #[must_use]
    pub fn cricket() -> Self {
        Self {
            keys: CRICKET_COLUMNS.iter().map(|k| (*k).to_string()).collect(),
        }
    }

    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Vector dimensionality under this schema.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for VectorSchema {
    fn default() -> Self {
        Self::cricket()
    }
}
