//! Per-format search handles
//!
//! Loads one stats pair per match format from an artifacts directory. A
//! format whose artifacts are missing or broken is remembered as failed; the
//! other formats keep serving.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{info, warn};

use crate::artifact::{load_pair, ArtifactKind, ArtifactPaths};
use crate::record::MatchFormat;
use crate::search::SearchEngine;
use crate::vectorize::VectorSchema;
use crate::{Error, Result};

/// Load the stats pair for `format` from `dir` and wrap it in an engine.
///
/// A pair built under a different schema still loads; the skew surfaces as
/// `DimensionMismatch` at query time.
pub fn load_engine(dir: &Path, format: MatchFormat, schema: &VectorSchema) -> Result<SearchEngine> {
    let stored = load_pair(&ArtifactPaths::new(dir, format, ArtifactKind::Stats))?;

    if let Some(built_with) = &stored.schema {
        if built_with != schema {
            warn!(
                %format,
                built = ?built_with.keys(),
                configured = ?schema.keys(),
                "index was built with a different vector schema"
            );
        }
    }

    Ok(SearchEngine::new(format, stored.pair, schema.clone()))
}

enum Slot {
    Ready(SearchEngine),
    Failed(String),
}

/// Loaded engines for every match format.
pub struct Catalog {
    slots: BTreeMap<MatchFormat, Slot>,
}

impl Catalog {
    /// Try to load every format from `dir`.
    pub fn open(dir: &Path, schema: &VectorSchema) -> Self {
        let mut slots = BTreeMap::new();

        for format in MatchFormat::ALL {
            let slot = match load_engine(dir, format, schema) {
                Ok(engine) => {
                    info!(%format, players = engine.len(), "format ready");
                    Slot::Ready(engine)
                }
                Err(Error::ArtifactLoad { reason, .. }) => {
                    warn!(%format, %reason, "format unavailable");
                    Slot::Failed(reason)
                }
                Err(e) => {
                    warn!(%format, error = %e, "format unavailable");
                    Slot::Failed(e.to_string())
                }
            };
            slots.insert(format, slot);
        }

        Self { slots }
    }

    /// The engine for `format`, or the reason it could not be loaded.
    pub fn engine(&self, format: MatchFormat) -> Result<&SearchEngine> {
        match self.slots.get(&format) {
            Some(Slot::Ready(engine)) => Ok(engine),
            Some(Slot::Failed(reason)) => Err(Error::ArtifactLoad {
                format,
                reason: reason.clone(),
            }),
            None => Err(Error::ArtifactLoad {
                format,
                reason: "format was never loaded".to_string(),
            }),
        }
    }

    /// Formats that loaded successfully.
    pub fn available(&self) -> impl Iterator<Item = MatchFormat> + '_ {
        self.slots.iter().filter_map(|(format, slot)| match slot {
            Slot::Ready(_) => Some(*format),
            Slot::Failed(_) => None,
        })
    }
}
