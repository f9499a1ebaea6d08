//! cricsim - find statistically similar cricket players
//!
//! # Architecture
//!
//! ```text
//! Records -> clean -> IndexBuilder -> IndexPair -> artifact::save_pair
//!                                                        |
//! Name  -> MetadataStore -> Vectorizer -> SearchEngine <-+ artifact::load_pair
//! Text  -> Embedder ------------------> TextSearchEngine
//!                                             |
//!                                          Results
//! ```
//!
//! One pair is built per match format. Pairs are immutable once built and
//! are replaced wholesale on rebuild.
//!
//! # Example
//!
//! ```ignore
//! use cricsim_lib::{build::IndexBuilder, record::MatchFormat, search::SearchEngine, vectorize::VectorSchema};
//!
//! let schema = VectorSchema::cricket();
//! let pair = IndexBuilder::new(schema.clone()).build(records)?;
//! let engine = SearchEngine::new(MatchFormat::Odi, pair, schema);
//! let similar = engine.search_by_name("Virat Kohli", 5)?;
//! ```

pub mod artifact;
pub mod build;
pub mod catalog;
pub mod config;
pub mod embed;
pub mod error;
pub mod index;
pub mod record;
pub mod search;
pub mod store;
pub mod vectorize;

pub use error::{Error, Result};
