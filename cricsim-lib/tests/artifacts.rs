use std::fs;

use cricsim_lib::artifact::{load_pair, save_pair, ArtifactKind, ArtifactPaths};
use cricsim_lib::build::IndexBuilder;
use cricsim_lib::catalog::{load_engine, Catalog};
use cricsim_lib::record::{MatchFormat, PlayerRecord};
use cricsim_lib::vectorize::VectorSchema;
use cricsim_lib::Error;
use tempfile::TempDir;

fn record(pairs: &[(&str, &str)]) -> PlayerRecord {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

fn players() -> Vec<PlayerRecord> {
    vec![
        record(&[("known_as", "V Kohli"), ("format", "ODI"), ("matches", "292"), ("runs", "13848"), ("bat_avg", "58.18")]),
        record(&[("known_as", "RG Sharma"), ("format", "ODI"), ("matches", "265"), ("runs", "10866"), ("bat_avg", "49.16")]),
        record(&[("known_as", "JJ Bumrah"), ("format", "ODI"), ("matches", "89"), ("wkts", "149"), ("e/r", "4.59")]),
    ]
}

fn save_stats(dir: &TempDir, format: MatchFormat, schema: &VectorSchema) -> ArtifactPaths {
    let paths = ArtifactPaths::new(dir.path(), format, ArtifactKind::Stats);
    let pair = IndexBuilder::new(schema.clone()).build(players()).unwrap();
    save_pair(&paths, &pair, Some(schema)).unwrap();
    paths
}

#[test]
fn test_roundtrip_preserves_pair() {
    let dir = TempDir::new().unwrap();
    let schema = VectorSchema::cricket();
    let paths = save_stats(&dir, MatchFormat::Odi, &schema);

    let built = IndexBuilder::new(schema.clone()).build(players()).unwrap();
    let stored = load_pair(&paths).unwrap();

    assert_eq!(stored.pair, built);
    assert_eq!(stored.schema, Some(schema));
    assert!(!paths.index.with_extension("index.tmp").exists());
}

#[test]
fn test_missing_metadata_is_artifact_error() {
    let dir = TempDir::new().unwrap();
    let paths = save_stats(&dir, MatchFormat::Test, &VectorSchema::cricket());
    fs::remove_file(&paths.metadata).unwrap();

    match load_pair(&paths) {
        Err(Error::ArtifactLoad { format, reason }) => {
            assert_eq!(format, MatchFormat::Test);
            assert!(reason.contains("missing"), "{reason}");
        }
        other => panic!("expected ArtifactLoad, got {other:?}"),
    }
}

#[test]
fn test_unpaired_halves_rejected() {
    let dir = TempDir::new().unwrap();
    let schema = VectorSchema::cricket();
    let odi = save_stats(&dir, MatchFormat::Odi, &schema);

    // a different build for T20, then swap in its metadata
    let t20 = ArtifactPaths::new(dir.path(), MatchFormat::T20, ArtifactKind::Stats);
    let other = IndexBuilder::new(schema.clone())
        .build(players().into_iter().take(2).collect())
        .unwrap();
    save_pair(&t20, &other, Some(&schema)).unwrap();
    fs::copy(&t20.metadata, &odi.metadata).unwrap();

    assert!(matches!(load_pair(&odi), Err(Error::ArtifactLoad { .. })));
}

#[test]
fn test_corrupt_index_rejected() {
    let dir = TempDir::new().unwrap();
    let paths = save_stats(&dir, MatchFormat::Odi, &VectorSchema::cricket());
    fs::write(&paths.index, b"not an index").unwrap();

    assert!(matches!(load_pair(&paths), Err(Error::ArtifactLoad { .. })));
}

#[test]
fn test_loaded_engine_searches() {
    let dir = TempDir::new().unwrap();
    let schema = VectorSchema::cricket();
    save_stats(&dir, MatchFormat::Odi, &schema);

    let engine = load_engine(dir.path(), MatchFormat::Odi, &schema).unwrap();
    let results = engine.search_by_name("v kohli", 2).unwrap();

    assert_eq!(results[0].record.known_as(), Some("V Kohli"));
    assert_eq!(results[1].record.known_as(), Some("RG Sharma"));
}

#[test]
fn test_schema_skew_surfaces_at_query() {
    let dir = TempDir::new().unwrap();
    save_stats(&dir, MatchFormat::Odi, &VectorSchema::cricket());

    let narrow = VectorSchema::new(["matches", "runs"]).unwrap();
    let engine = load_engine(dir.path(), MatchFormat::Odi, &narrow).unwrap();

    assert!(matches!(
        engine.search_by_name("V Kohli", 3),
        Err(Error::DimensionMismatch { expected: 10, actual: 2 })
    ));
}

#[test]
fn test_catalog_keeps_other_formats_usable() {
    let dir = TempDir::new().unwrap();
    let schema = VectorSchema::cricket();
    save_stats(&dir, MatchFormat::Odi, &schema);
    let test = save_stats(&dir, MatchFormat::Test, &schema);
    fs::remove_file(&test.index).unwrap();

    let catalog = Catalog::open(dir.path(), &schema);

    assert!(catalog.engine(MatchFormat::Odi).is_ok());
    assert!(matches!(
        catalog.engine(MatchFormat::Test),
        Err(Error::ArtifactLoad { format: MatchFormat::Test, .. })
    ));
    assert!(catalog.engine(MatchFormat::T20).is_err());
    assert_eq!(catalog.available().collect::<Vec<_>>(), vec![MatchFormat::Odi]);
}

#[test]
fn test_failed_save_leaves_no_temp_files() {
    let dir = TempDir::new().unwrap();
    let schema = VectorSchema::cricket();
    let paths = ArtifactPaths::new(dir.path(), MatchFormat::Odi, ArtifactKind::Stats);
    // a non-empty directory where the index should go makes the rename fail
    fs::create_dir_all(paths.index.join("blocker")).unwrap();

    let pair = IndexBuilder::new(schema.clone()).build(players()).unwrap();
    assert!(save_pair(&paths, &pair, Some(&schema)).is_err());

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "{leftovers:?}");
    assert!(!paths.metadata.exists());
}
