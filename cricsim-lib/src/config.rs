//! Settings
//!
//! Loaded from embedded defaults, an optional `cricsim.toml` in the working
//! directory, then `CRICSIM_*` environment variables (highest priority).

use std::path::PathBuf;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::embed::BgeModel;
use crate::vectorize::VectorSchema;
use crate::{Error, Result};

/// Embedded default configuration
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Directory holding the index and metadata files
    pub artifacts_dir: PathBuf,
    /// Results returned when a query does not say
    pub top_k: usize,
    /// Statistic columns making up each player vector
    pub schema: Vec<String>,
    /// Model used for free-text queries
    pub embedding_model: BgeModel,
}

impl Settings {
    /// Load settings from defaults, `cricsim.toml` and the environment.
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Config::builder()
                .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
                .add_source(File::with_name("cricsim").required(false))
                .add_source(environment()),
        )
    }

    /// Load settings from defaults overlaid with a TOML string.
    pub fn from_toml(toml: &str) -> Result<Self> {
        Self::from_builder(
            Config::builder()
                .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
                .add_source(File::from_str(toml, FileFormat::Toml)),
        )
    }

    fn from_builder(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let settings: Settings = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|e| Error::Config(e.to_string()))?;

        if settings.top_k == 0 {
            return Err(Error::Config("top_k must be at least 1".into()));
        }
        settings.vector_schema()?;

        Ok(settings)
    }

    /// The configured schema.
    pub fn vector_schema(&self) -> Result<VectorSchema> {
        VectorSchema::new(self.schema.iter().cloned())
            .map_err(|e| Error::Config(e.to_string()))
    }
}

/// `CRICSIM_TOP_K=7`, `CRICSIM_SCHEMA=runs,wkts` and so on.
fn environment() -> Environment {
    Environment::with_prefix("CRICSIM")
        .prefix_separator("_")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("schema")
}
