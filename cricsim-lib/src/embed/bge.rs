use std::fmt;
use std::str::FromStr;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::embed::{Embedder, Embedding};
use crate::{Error, Result};

/// Prefix BGE expects on retrieval queries
const QUERY_PREFIX: &str = "Represent this sentence for searching relevant passages: ";

/// Supported BGE model sizes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BgeModel {
    /// BAAI/bge-small-en-v1.5, 384 dimensions
    #[default]
    Small,
    /// BAAI/bge-base-en-v1.5, 768 dimensions
    Base,
    /// BAAI/bge-large-en-v1.5, 1024 dimensions
    Large,
}

impl BgeModel {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            BgeModel::Small => "bge-small-en-v1.5",
            BgeModel::Base => "bge-base-en-v1.5",
            BgeModel::Large => "bge-large-en-v1.5",
        }
    }

    #[must_use]
    pub fn dimension(self) -> usize {
        match self {
            BgeModel::Small => 384,
            BgeModel::Base => 768,
            BgeModel::Large => 1024,
        }
    }

    fn fastembed_model(self) -> EmbeddingModel {
        match self {
            BgeModel::Small => EmbeddingModel::BGESmallENV15,
            BgeModel::Base => EmbeddingModel::BGEBaseENV15,
            BgeModel::Large => EmbeddingModel::BGELargeENV15,
        }
    }
}

impl fmt::Display for BgeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BgeModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        let s = s.strip_prefix("baai/").unwrap_or(&s);
        [BgeModel::Small, BgeModel::Base, BgeModel::Large]
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unsupported embedding model '{s}'")))
    }
}

impl TryFrom<String> for BgeModel {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<BgeModel> for String {
    fn from(model: BgeModel) -> Self {
        model.name().to_string()
    }
}

/// BGE embedder backed by fastembed.
///
/// Downloads the model on first use (~130MB for small, ~1.2GB for large).
pub struct BgeEmbedder {
    model: TextEmbedding,
    kind: BgeModel,
}

impl BgeEmbedder {
    /// Load the given BGE model.
    pub fn new(kind: BgeModel) -> Result<Self> {
        let opts = InitOptions::new(kind.fastembed_model()).with_show_download_progress(true);

        let model = TextEmbedding::try_new(opts).map_err(|e| Error::Embedding(e.to_string()))?;
        info!(model = kind.name(), dimension = kind.dimension(), "loaded embedding model");

        Ok(Self { model, kind })
    }
}

impl Embedder for BgeEmbedder {
    fn model_name(&self) -> &str {
        self.kind.name()
    }

    fn dimension(&self) -> usize {
        self.kind.dimension()
    }

    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        self.model
            .embed(texts, None)
            .map_err(|e| Error::Embedding(e.to_string()))
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        let query_text = format!("{QUERY_PREFIX}{text}");

        self.model
            .embed(vec![query_text], None)
            .map_err(|e| Error::Embedding(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("model returned no embeddings".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_names_parse() {
        assert_eq!("bge-small-en-v1.5".parse::<BgeModel>().unwrap(), BgeModel::Small);
        assert_eq!("BAAI/bge-large-en-v1.5".parse::<BgeModel>().unwrap(), BgeModel::Large);
        assert!("all-minilm".parse::<BgeModel>().is_err());
    }

    #[test]
    fn test_model_serde_as_string() {
        let json = serde_json::to_string(&BgeModel::Base).unwrap();
        assert_eq!(json, r#""bge-base-en-v1.5""#);
        let model: BgeModel = serde_json::from_str(&json).unwrap();
        assert_eq!(model, BgeModel::Base);
    }

    #[test]
    #[ignore] // Requires model download, run with: cargo test -- --ignored
    fn test_embedding_dimension_matches_model() {
        let mut embedder = BgeEmbedder::new(BgeModel::Small).unwrap();
        let query = embedder.embed_query("left-arm seamer").unwrap();
        assert_eq!(query.len(), embedder.dimension());
    }

    #[test]
    #[ignore] // Requires model download
    fn test_related_text_is_closer() {
        let mut embedder = BgeEmbedder::new(BgeModel::Small).unwrap();
        let docs = embedder
            .embed_documents(&[
                "Opening batter with many centuries and a high batting average.",
                "Fast bowler who takes lots of wickets with a low economy rate.",
            ])
            .unwrap();
        let query = embedder.embed_query("prolific run scorer").unwrap();

        let dot = |a: &[f32], b: &[f32]| a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
        assert!(dot(&query, &docs[0]) > dot(&query, &docs[1]));
    }
}
