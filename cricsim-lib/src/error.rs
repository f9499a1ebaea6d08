//! Error types for cricsim

use thiserror::Error;

use crate::record::MatchFormat;

/// Result type alias for cricsim operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cricsim operations
#[derive(Error, Debug)]
pub enum Error {
    /// Name lookup found no case-insensitive exact match
    #[error("player '{name}' not found in {format} data")]
    PlayerNotFound { name: String, format: MatchFormat },

    /// Query vector length differs from the index dimensionality
    #[error("dimension mismatch: vector has {actual}, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Index and metadata artifacts missing, unpaired or inconsistent
    #[error("failed to load {format} artifacts: {reason}")]
    ArtifactLoad { format: MatchFormat, reason: String },

    /// Failed to load or run the embedding model
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Invalid input provided
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Settings could not be built or deserialized
    #[error("config error: {0}")]
    Config(String),

    /// Failed to encode or decode an artifact
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
