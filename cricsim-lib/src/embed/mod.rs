//! Text embedding for free-text player queries
//!
//! Free-text questions ("aggressive opener with a high strike rate") are
//! embedded into a dense space that has nothing to do with the numeric stats
//! vectors. Text queries are therefore answered from their own index pair,
//! built by [`crate::build::TextIndexBuilder`] with the same embedder.
//!
//! Uses the BGE family via the fastembed crate (ONNX runtime).
//!
//! # Usage
//!
//! ```ignore
//! use cricsim_lib::embed::{BgeEmbedder, BgeModel, Embedder};
//!
//! let mut embedder = BgeEmbedder::new(BgeModel::Small)?;
//! let docs = embedder.embed_documents(&["V Kohli (ODI): runs 13848; bat_avg 58.18"])?;
//! let query = embedder.embed_query("prolific ODI run scorer")?;
//! ```

use crate::Result;

/// A dense text embedding
pub type Embedding = Vec<f32>;

/// Trait for text embedding models
pub trait Embedder: Send + Sync {
    /// Embed multiple documents for indexing
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>>;

    /// Embed a single query for searching
    ///
    /// Some models (like BGE) use a different prompt for queries than for
    /// documents; implementations apply it here.
    fn embed_query(&mut self, text: &str) -> Result<Embedding>;

    /// Returns the embedding dimension
    fn dimension(&self) -> usize;

    /// Returns the model name/identifier
    fn model_name(&self) -> &str;
}

mod bge;

pub use bge::*;
