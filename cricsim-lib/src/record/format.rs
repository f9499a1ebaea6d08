use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Match format. Every format gets its own index pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchFormat {
    #[serde(rename = "Test")]
    Test,
    #[serde(rename = "ODI")]
    Odi,
    #[serde(rename = "T20")]
    T20,
}

impl MatchFormat {
    pub const ALL: [MatchFormat; 3] = [MatchFormat::Test, MatchFormat::Odi, MatchFormat::T20];

    /// Display name as stored in the `format` field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MatchFormat::Test => "Test",
            MatchFormat::Odi => "ODI",
            MatchFormat::T20 => "T20",
        }
    }

    /// Lowercase stem used in artifact file names.
    #[must_use]
    pub fn stem(self) -> &'static str {
        match self {
            MatchFormat::Test => "test",
            MatchFormat::Odi => "odi",
            MatchFormat::T20 => "t20",
        }
    }

    /// Map a raw scraper code (`T`, `O`, `W`) to its format.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "T" => Some(MatchFormat::Test),
            "O" => Some(MatchFormat::Odi),
            "W" => Some(MatchFormat::T20),
            _ => None,
        }
    }
}

impl fmt::Display for MatchFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(format) = MatchFormat::from_code(s) {
            return Ok(format);
        }
        let s = s.trim();
        MatchFormat::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::InvalidInput(format!("unknown match format '{s}', choose from Test, ODI, T20"))
            })
    }
}
