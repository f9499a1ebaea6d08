//! Offline construction of index pairs
//!
//! Builders consume records once, in order, and seal the result into an
//! [`IndexPair`]. A schema or data change means building a new pair from
//! scratch; existing pairs are never patched.

use tracing::{info, warn};

use crate::embed::Embedder;
use crate::index::FlatIndex;
use crate::record::{PlayerRecord, FORMAT_FIELD, NAME_FIELD};
use crate::store::{IndexPair, MetadataStore};
use crate::vectorize::{l2_normalize, Vectorizer, VectorSchema};
use crate::{Error, Result};

/// Builds numeric-stats index pairs.
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    vectorizer: Vectorizer,
}

impl IndexBuilder {
    #[must_use]
    pub fn new(schema: VectorSchema) -> Self {
        Self {
            vectorizer: Vectorizer::new(schema),
        }
    }

    #[must_use]
    pub fn vectorizer(&self) -> &Vectorizer {
        &self.vectorizer
    }

    /// Vectorize, normalize and index `records` in input order.
    ///
    /// The metadata keeps the original records, not the normalized values.
    pub fn build(&self, records: Vec<PlayerRecord>) -> Result<IndexPair> {
        let mut index = FlatIndex::new(self.vectorizer.dimension())?;
        let mut zero_rows = 0usize;

        for record in &records {
            let vector = self.vectorizer.vectorize_normalized(record);
            if vector.iter().all(|v| *v == 0.0) {
                zero_rows += 1;
            }
            index.add(&vector)?;
        }

        if zero_rows > 0 {
            warn!(zero_rows, "records with no usable statistics are indexed as zero vectors");
        }
        info!(
            records = records.len(),
            dimension = index.dimension(),
            "built stats index"
        );

        IndexPair::new(index, MetadataStore::new(records))
    }
}

/// Render a record as a short text passage for embedding.
///
/// Name and format lead, then the remaining fields in key order.
#[must_use]
pub fn describe(record: &PlayerRecord) -> String {
    let mut parts = Vec::with_capacity(record.len());

    if let Some(value) = record.get(NAME_FIELD) {
        parts.push(value.to_string());
    }
    if let Some(value) = record.get(FORMAT_FIELD) {
        parts.push(format!("format: {value}"));
    }
    let mut rest: Vec<_> = record
        .iter()
        .filter(|(key, _)| *key != NAME_FIELD && *key != FORMAT_FIELD)
        .collect();
    rest.sort_by_key(|(key, _)| *key);
    parts.extend(rest.into_iter().map(|(key, value)| format!("{key}: {value}")));

    parts.join("; ")
}

/// Builds index pairs in an embedding space, for free-text queries.
pub struct TextIndexBuilder<'a, E: Embedder> {
    embedder: &'a mut E,
}

impl<'a, E: Embedder> TextIndexBuilder<'a, E> {
    pub fn new(embedder: &'a mut E) -> Self {
        Self { embedder }
    }

    /// Embed a description of every record and index the normalized
    /// embeddings alongside the records.
    pub fn build(&mut self, records: Vec<PlayerRecord>) -> Result<IndexPair> {
        let mut index = FlatIndex::new(self.embedder.dimension())?;

        if !records.is_empty() {
            let descriptions: Vec<String> = records.iter().map(describe).collect();
            let texts: Vec<&str> = descriptions.iter().map(String::as_str).collect();

            let embeddings = self.embedder.embed_documents(&texts)?;
            if embeddings.len() != texts.len() {
                return Err(Error::Embedding(format!(
                    "model returned {} embeddings for {} records",
                    embeddings.len(),
                    texts.len()
                )));
            }

            for mut embedding in embeddings {
                l2_normalize(&mut embedding);
                index.add(&embedding)?;
            }
        }

        info!(
            records = records.len(),
            dimension = index.dimension(),
            model = self.embedder.model_name(),
            "built text index"
        );

        IndexPair::new(index, MetadataStore::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::StatValue;

    fn record(pairs: &[(&str, &str)]) -> PlayerRecord {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    fn schema() -> VectorSchema {
        VectorSchema::new(["matches", "runs"]).unwrap()
    }

    #[test]
    fn test_build_preserves_order_and_originals() {
        let records = vec![
            record(&[("known_as", "A"), ("matches", "10"), ("runs", "500*")]),
            record(&[("known_as", "B"), ("matches", "1"), ("runs", "5")]),
        ];
        let pair = IndexBuilder::new(schema()).build(records.clone()).unwrap();

        assert_eq!(pair.len(), 2);
        assert_eq!(pair.dimension(), 2);
        assert_eq!(pair.metadata().records(), records.as_slice());
        assert_eq!(
            pair.record(0).and_then(|r| r.get("runs")),
            Some(&StatValue::from("500*"))
        );
    }

    #[test]
    fn test_rows_are_unit_length() {
        let pair = IndexBuilder::new(schema())
            .build(vec![record(&[("matches", "3"), ("runs", "4")])])
            .unwrap();

        let row = pair.index().vector(0).unwrap();
        assert!((row[0] - 0.6).abs() < 1e-6);
        assert!((row[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_zero_row_kept() {
        let pair = IndexBuilder::new(schema())
            .build(vec![record(&[("known_as", "Nobody"), ("runs", "-")])])
            .unwrap();

        assert_eq!(pair.index().vector(0), Some(&[0.0, 0.0][..]));
    }

    #[test]
    fn test_build_empty() {
        let pair = IndexBuilder::new(schema()).build(Vec::new()).unwrap();
        assert!(pair.is_empty());
        assert_eq!(pair.dimension(), 2);
    }

    #[test]
    fn test_rebuild_is_identical() {
        let records = vec![
            record(&[("known_as", "A"), ("matches", "7"), ("runs", "301")]),
            record(&[("known_as", "B"), ("matches", "2"), ("runs", "x")]),
        ];
        let builder = IndexBuilder::new(schema());
        assert_eq!(
            builder.build(records.clone()).unwrap(),
            builder.build(records).unwrap()
        );
    }

    #[test]
    fn test_describe_leads_with_name_and_format() {
        let text = describe(&record(&[
            ("runs", "500"),
            ("known_as", "A"),
            ("format", "ODI"),
            ("bat_avg", "-"),
        ]));
        assert_eq!(text, "A; format: ODI; bat_avg: -; runs: 500");
    }
}
