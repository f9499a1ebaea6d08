//! Conversion of player records into fixed-length feature vectors
//!
//! Scraped statistics arrive as numbers, numeric strings, annotated strings
//! (`"120*"` for not out) or placeholders (`"-"`). Every schema field maps to
//! exactly one float; anything that cannot be read as a number becomes `0.0`
//! rather than failing the whole record.
//!
//! # Usage
//!
//! ```ignore
//! use cricsim_lib::vectorize::{Vectorizer, VectorSchema};
//!
//! let vectorizer = Vectorizer::new(VectorSchema::cricket());
//! let vector = vectorizer.vectorize(&record);
//! assert_eq!(vector.len(), 10);
//! ```

use crate::record::{PlayerRecord, StatValue};

mod schema;

pub use schema::*;

/// A fixed-length numeric encoding of one record
pub type FeatureVector = Vec<f32>;

/// Annotation characters stripped from textual stats before parsing
pub const STAT_MARKERS: &[char] = &['*'];

/// Tokens meaning "no data"
const PLACEHOLDERS: &[&str] = &["-", ""];

/// Token used for fields the record does not have
const MISSING: &str = "0";

/// Parse one textual statistic, falling back to `0.0`.
///
/// Markers are removed and surrounding whitespace trimmed; placeholders and
/// anything that does not parse as a finite float yield `0.0`.
#[must_use]
pub fn parse_stat_or_default(token: &str) -> f32 {
    let cleaned = token.replace(STAT_MARKERS, "");
    let cleaned = cleaned.trim();
    if PLACEHOLDERS.contains(&cleaned) {
        return 0.0;
    }
    cleaned
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn stat_value_to_f32(value: &StatValue) -> f32 {
    match value {
        StatValue::Text(s) => parse_stat_or_default(s),
        StatValue::Number(n) => {
            let n = *n as f32;
            if n.is_finite() { n } else { 0.0 }
        }
        StatValue::Bool(b) => f32::from(u8::from(*b)),
        StatValue::Null => 0.0,
    }
}

/// Scale `vector` to unit Euclidean length in place.
///
/// A zero vector has no direction and is left as is; it ends up at distance
/// 1 from every unit vector and 0 from other zero vectors.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector {
            *v /= norm;
        }
    }
}

/// Turns records into vectors under a fixed schema.
#[derive(Debug, Clone, Default)]
pub struct Vectorizer {
    schema: VectorSchema,
}

impl Vectorizer {
    #[must_use]
    pub fn new(schema: VectorSchema) -> Self {
        Self { schema }
    }

    #[must_use]
    pub fn schema(&self) -> &VectorSchema {
        &self.schema
    }

    /// Output dimensionality.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.schema.len()
    }

    /// Vectorize one record. The result always has `dimension()` entries in
    /// schema order.
    #[must_use]
    pub fn vectorize(&self, record: &PlayerRecord) -> FeatureVector {
        self.schema
            .keys()
            .iter()
            .map(|key| match record.get(key) {
                Some(value) => stat_value_to_f32(value),
                None => parse_stat_or_default(MISSING),
            })
            .collect()
    }

    /// Vectorize and L2-normalize one record.
    #[must_use]
    pub fn vectorize_normalized(&self, record: &PlayerRecord) -> FeatureVector {
        let mut vector = self.vectorize(record);
        l2_normalize(&mut vector);
        vector
    }
}
