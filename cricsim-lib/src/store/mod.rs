//! Index and metadata, held together
//!
//! An [`IndexPair`] is the unit that gets built, persisted, loaded and
//! searched. Row `i` of the index is record `i` of the metadata store; the
//! pair is sealed on construction and offers no way to change either half.
//!
//! # Storage Model
//!
//! Each pair consists of:
//! - FlatIndex: one L2-normalized vector per player
//! - MetadataStore: the original, un-normalized records in the same order

use crate::index::FlatIndex;
use crate::record::PlayerRecord;
use crate::{Error, Result};

mod metadata;

pub use metadata::*;

/// A position-aligned (index, metadata) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexPair {
    index: FlatIndex,
    metadata: MetadataStore,
}

impl IndexPair {
    /// Seal an index with its metadata. Both must hold the same number of
    /// entries.
    pub fn new(index: FlatIndex, metadata: MetadataStore) -> Result<Self> {
        if index.len() != metadata.len() {
            return Err(Error::InvalidInput(format!(
                "index holds {} vectors but metadata holds {} records",
                index.len(),
                metadata.len()
            )));
        }
        Ok(Self { index, metadata })
    }

    #[must_use]
    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    #[must_use]
    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    /// The record backing index row `position`.
    #[must_use]
    pub fn record(&self, position: usize) -> Option<&PlayerRecord> {
        self.metadata.get(position)
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.metadata.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty()
    }
}
