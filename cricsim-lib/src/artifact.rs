//! Persistence of index pairs
//!
//! Each pair is written as two files: a binary index blob and a JSON
//! metadata blob. Both carry the same `pair_id`, a fingerprint of the index
//! contents, so a reader can tell when it is looking at halves of two
//! different builds.
//!
//! ```text
//! <dir>/odi_stats.index          bincode: magic, version, pair_id, dimension, vectors
//! <dir>/odi_stats_metadata.json  json:    pair_id, dimension, schema, records
//! ```

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, instrument, warn};

use crate::index::FlatIndex;
use crate::record::MatchFormat;
use crate::store::{IndexPair, MetadataStore};
use crate::vectorize::VectorSchema;
use crate::{Error, Result};

const INDEX_MAGIC: [u8; 4] = *b"CSIX";
const INDEX_VERSION: u16 = 2;

/// Which vector space a pair lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Numeric statistics vectors
    Stats,
    /// Text embeddings
    Text,
}

impl ArtifactKind {
    fn suffix(self) -> &'static str {
        match self {
            ArtifactKind::Stats => "stats",
            ArtifactKind::Text => "text",
        }
    }
}

/// Locations of the two files making up one pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub format: MatchFormat,
    pub index: PathBuf,
    pub metadata: PathBuf,
}

impl ArtifactPaths {
    #[must_use]
    pub fn new(dir: &Path, format: MatchFormat, kind: ArtifactKind) -> Self {
        let base = format!("{}_{}", format.stem(), kind.suffix());
        Self {
            format,
            index: dir.join(format!("{base}.index")),
            metadata: dir.join(format!("{base}_metadata.json")),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct IndexBlob {
    magic: [u8; 4],
    version: u16,
    pair_id: String,
    dimension: u64,
    data: Vec<f32>,
}

#[derive(Serialize, Deserialize)]
struct MetadataBlob {
    pair_id: String,
    dimension: usize,
    schema: Option<VectorSchema>,
    records: MetadataStore,
}

/// A pair as read back from disk, with the schema it was built under.
#[derive(Debug, Clone)]
pub struct StoredPair {
    pub pair: IndexPair,
    /// `None` for text pairs
    pub schema: Option<VectorSchema>,
}

/// Content fingerprint shared by both halves of a pair.
///
/// SHA-256 over the dimension, the row count and the raw bits of every
/// value, all little-endian, as lowercase hex.
#[must_use]
pub fn pair_id(index: &FlatIndex) -> String {
    let mut hasher = Sha256::new();
    hasher.update((index.dimension() as u64).to_le_bytes());
    hasher.update((index.len() as u64).to_le_bytes());
    for value in index.as_slice() {
        hasher.update(value.to_bits().to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Write a pair to `paths`.
///
/// Both files are written to temporary siblings and synced before either is
/// renamed into place. On failure the temporary files are removed.
#[instrument(skip(pair, schema), fields(format = %paths.format, records = pair.len()))]
pub fn save_pair(paths: &ArtifactPaths, pair: &IndexPair, schema: Option<&VectorSchema>) -> Result<()> {
    let id = pair_id(pair.index());

    let index_blob = IndexBlob {
        magic: INDEX_MAGIC,
        version: INDEX_VERSION,
        pair_id: id.clone(),
        dimension: pair.dimension() as u64,
        data: pair.index().as_slice().to_vec(),
    };
    let metadata_blob = MetadataBlob {
        pair_id: id.clone(),
        dimension: pair.dimension(),
        schema: schema.cloned(),
        records: pair.metadata().clone(),
    };

    if let Some(dir) = paths.index.parent() {
        fs::create_dir_all(dir)?;
    }
    if let Some(dir) = paths.metadata.parent() {
        fs::create_dir_all(dir)?;
    }

    let index_tmp = temp_path(&paths.index);
    let metadata_tmp = temp_path(&paths.metadata);

    let published = write_synced(&index_tmp, |w| {
        bincode::serialize_into(w, &index_blob).map_err(|e| Error::Serialization(e.to_string()))
    })
    .and_then(|()| {
        write_synced(&metadata_tmp, |w| {
            serde_json::to_writer(w, &metadata_blob).map_err(|e| Error::Serialization(e.to_string()))
        })
    })
    .and_then(|()| fs::rename(&index_tmp, &paths.index).map_err(Error::from))
    .and_then(|()| fs::rename(&metadata_tmp, &paths.metadata).map_err(Error::from));

    if let Err(e) = published {
        warn!(error = %e, "saving index pair failed, removing temporary files");
        for tmp in [&index_tmp, &metadata_tmp] {
            if tmp.exists() {
                let _ = fs::remove_file(tmp);
            }
        }
        return Err(e);
    }

    info!(
        index = %paths.index.display(),
        metadata = %paths.metadata.display(),
        pair_id = %id,
        "saved index pair"
    );
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_synced<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&File>) -> Result<()>,
{
    let file = File::create(path)?;
    let mut writer = BufWriter::new(&file);
    write(&mut writer)?;
    writer.flush()?;
    drop(writer);
    file.sync_all()?;
    Ok(())
}

/// Load the pair at `paths`. Both files must be present and agree.
#[instrument(fields(format = %paths.format))]
pub fn load_pair(paths: &ArtifactPaths) -> Result<StoredPair> {
    let format = paths.format;
    let fail = |reason: String| Error::ArtifactLoad { format, reason };

    for path in [&paths.index, &paths.metadata] {
        if !path.exists() {
            return Err(fail(format!("{} is missing", path.display())));
        }
    }

    let index_blob: IndexBlob = File::open(&paths.index)
        .map_err(|e| fail(format!("cannot open {}: {e}", paths.index.display())))
        .and_then(|file| {
            bincode::deserialize_from(BufReader::new(file))
                .map_err(|e| fail(format!("cannot decode {}: {e}", paths.index.display())))
        })?;

    if index_blob.magic != INDEX_MAGIC {
        return Err(fail(format!("{} is not an index file", paths.index.display())));
    }
    if index_blob.version != INDEX_VERSION {
        return Err(fail(format!(
            "unsupported index version {} (expected {INDEX_VERSION})",
            index_blob.version
        )));
    }

    let metadata_blob: MetadataBlob = File::open(&paths.metadata)
        .map_err(|e| fail(format!("cannot open {}: {e}", paths.metadata.display())))
        .and_then(|file| {
            serde_json::from_reader(BufReader::new(file))
                .map_err(|e| fail(format!("cannot decode {}: {e}", paths.metadata.display())))
        })?;

    if metadata_blob.pair_id != index_blob.pair_id {
        return Err(fail(format!(
            "index {} and metadata {} come from different builds",
            index_blob.pair_id, metadata_blob.pair_id
        )));
    }

    let dimension = usize::try_from(index_blob.dimension)
        .map_err(|_| fail(format!("index dimension {} out of range", index_blob.dimension)))?;
    if metadata_blob.dimension != dimension {
        return Err(fail(format!(
            "index dimension {dimension} but metadata records dimension {}",
            metadata_blob.dimension
        )));
    }

    let index = FlatIndex::from_parts(dimension, index_blob.data).map_err(|e| fail(e.to_string()))?;
    if pair_id(&index) != index_blob.pair_id {
        return Err(fail("index contents do not match their fingerprint".to_string()));
    }

    let pair = IndexPair::new(index, metadata_blob.records).map_err(|e| fail(e.to_string()))?;

    info!(records = pair.len(), dimension, "loaded index pair");
    Ok(StoredPair {
        pair,
        schema: metadata_blob.schema,
    })
}
