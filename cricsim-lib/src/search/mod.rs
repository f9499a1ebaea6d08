//! Similar-player search
//!
//! Two query paths over loaded, read-only index pairs:
//!
//! - [`SearchEngine::search_by_name`] looks a player up in the metadata and
//!   uses their own stats vector as the query.
//! - [`TextSearchEngine::search_by_text`] embeds a free-text question and
//!   searches a pair built in the same embedding space.
//!
//! # Usage
//!
//! ```ignore
//! use cricsim_lib::search::SearchEngine;
//!
//! let engine = SearchEngine::new(MatchFormat::Odi, pair, VectorSchema::cricket());
//! for hit in engine.search_by_name("Virat Kohli", 5)? {
//!     println!("{:?} {:.4}", hit.record.known_as(), hit.distance);
//! }
//! ```
//!
//! The queried player is not removed from their own results; with a distance
//! of zero to themselves they normally come first.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::embed::Embedder;
use crate::index::Neighbor;
use crate::record::{MatchFormat, PlayerRecord};
use crate::store::IndexPair;
use crate::vectorize::{l2_normalize, VectorSchema, Vectorizer};
use crate::{Error, Result};

/// A search result, nearest first
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Row position in the index and metadata store
    pub position: usize,
    /// Squared L2 distance between normalized vectors (lower is closer)
    pub distance: f32,
    /// The matched player's original record
    pub record: PlayerRecord,
}

fn query_pair(pair: &IndexPair, query: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
    let neighbors = pair.index().search(query, top_k)?;

    neighbors
        .into_iter()
        .map(|Neighbor { position, distance }| {
            pair.record(position)
                .cloned()
                .map(|record| SearchResult {
                    position,
                    distance,
                    record,
                })
                .ok_or_else(|| {
                    Error::InvalidInput(format!("index row {position} has no metadata record"))
                })
        })
        .collect()
}

/// Name-based search over one format's stats pair.
///
/// Cloning is cheap; clones share the loaded pair.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    format: MatchFormat,
    pair: Arc<IndexPair>,
    vectorizer: Vectorizer,
}

impl SearchEngine {
    /// Serve queries for `format` from `pair`, vectorizing under `schema`.
    #[must_use]
    pub fn new(format: MatchFormat, pair: impl Into<Arc<IndexPair>>, schema: VectorSchema) -> Self {
        Self {
            format,
            pair: pair.into(),
            vectorizer: Vectorizer::new(schema),
        }
    }

    /// Find the players most similar to `name`, nearest first.
    ///
    /// # Errors
    /// * `PlayerNotFound` when no record's `known_as` equals `name`, ignoring case
    /// * `DimensionMismatch` when the configured schema does not fit the index
    #[instrument(skip(self), fields(format = %self.format))]
    pub fn search_by_name(&self, name: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let (position, record) = self
            .pair
            .metadata()
            .find_by_name(name)
            .ok_or_else(|| Error::PlayerNotFound {
                name: name.to_string(),
                format: self.format,
            })?;

        let mut query = self.vectorizer.vectorize(record);
        if query.len() != self.pair.dimension() {
            return Err(Error::DimensionMismatch {
                expected: self.pair.dimension(),
                actual: query.len(),
            });
        }
        l2_normalize(&mut query);

        let results = query_pair(&self.pair, &query, top_k)?;
        debug!(position, results = results.len(), "name search complete");
        Ok(results)
    }

    /// The raw, un-normalized vector for `name`.
    pub fn vector_for(&self, name: &str) -> Result<Vec<f32>> {
        self.pair
            .metadata()
            .find_by_name(name)
            .map(|(_, record)| self.vectorizer.vectorize(record))
            .ok_or_else(|| Error::PlayerNotFound {
                name: name.to_string(),
                format: self.format,
            })
    }

    #[must_use]
    pub fn format(&self) -> MatchFormat {
        self.format
    }

    #[must_use]
    pub fn schema(&self) -> &VectorSchema {
        self.vectorizer.schema()
    }

    #[must_use]
    pub fn pair(&self) -> &IndexPair {
        &self.pair
    }

    /// Returns the number of indexed players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pair.len()
    }

    /// Returns `true` if no players are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pair.is_empty()
    }
}

/// Free-text search over a pair built in the embedder's space.
pub struct TextSearchEngine<E: Embedder> {
    format: MatchFormat,
    embedder: E,
    pair: Arc<IndexPair>,
}

impl<E: Embedder> TextSearchEngine<E> {
    #[must_use]
    pub fn new(format: MatchFormat, embedder: E, pair: impl Into<Arc<IndexPair>>) -> Self {
        Self {
            format,
            embedder,
            pair: pair.into(),
        }
    }

    /// Find the players whose descriptions best match `query`.
    ///
    /// # Errors
    /// * `Embedding` when the provider fails
    /// * `DimensionMismatch` when the embedder does not match the pair's space
    #[instrument(skip(self), fields(format = %self.format, model = self.embedder.model_name()))]
    pub fn search_by_text(&mut self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let mut embedding = self.embedder.embed_query(query)?;
        if embedding.len() != self.pair.dimension() {
            return Err(Error::DimensionMismatch {
                expected: self.pair.dimension(),
                actual: embedding.len(),
            });
        }
        l2_normalize(&mut embedding);

        let results = query_pair(&self.pair, &embedding, top_k)?;
        debug!(results = results.len(), "text search complete");
        Ok(results)
    }

    #[must_use]
    pub fn format(&self) -> MatchFormat {
        self.format
    }

    /// Returns a reference to the embedder.
    #[must_use]
    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    #[must_use]
    pub fn pair(&self) -> &IndexPair {
        &self.pair
    }
}
