//! cricsim CLI - build player indexes and query them
//!
//! # Commands
//!
//! ```bash
//! # Clean scraped records and build stats indexes for every format
//! cricsim build players.json
//!
//! # Also build free-text indexes (downloads the embedding model)
//! cricsim build players.json --format ODI --text
//!
//! # Players most similar to a given player
//! cricsim similar "Virat Kohli" --format T20 -k 5
//!
//! # Free-text question against the text index
//! cricsim ask "left-arm spinner with a low economy rate" --format Test
//!
//! # Show the stats vector used for a player
//! cricsim vector "Babar Azam" --format ODI
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cricsim_lib::{
    artifact::{load_pair, save_pair, ArtifactKind, ArtifactPaths},
    build::{IndexBuilder, TextIndexBuilder},
    catalog::load_engine,
    config::Settings,
    embed::BgeEmbedder,
    record::{clean_records, partition_by_format, MatchFormat, PlayerRecord},
    search::{SearchResult, TextSearchEngine},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cricsim")]
#[command(about = "Find statistically similar cricket players")]
#[command(version)]
struct Cli {
    /// Directory holding index and metadata files (overrides settings)
    #[arg(long, global = true)]
    artifacts_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean records and build index pairs
    Build {
        /// JSON array of scraped player records
        input: PathBuf,

        /// Only build this format (Test, ODI, T20)
        #[arg(short, long)]
        format: Option<MatchFormat>,

        /// Also build free-text indexes
        #[arg(long)]
        text: bool,
    },

    /// List players most similar to a named player
    Similar {
        /// Player name, matched exactly ignoring case
        name: String,

        #[arg(short, long, default_value = "ODI")]
        format: MatchFormat,

        /// Number of results (defaults to settings)
        #[arg(short)]
        k: Option<usize>,
    },

    /// Ask a free-text question against the text index
    Ask {
        query: String,

        #[arg(short, long, default_value = "ODI")]
        format: MatchFormat,

        /// Number of results (defaults to settings)
        #[arg(short)]
        k: Option<usize>,
    },

    /// Print the stats vector used for a player
    Vector {
        name: String,

        #[arg(short, long, default_value = "ODI")]
        format: MatchFormat,
    },
}

fn read_records(path: &Path) -> Result<Vec<PlayerRecord>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing player records from {}", path.display()))
}

fn print_results(results: &[SearchResult]) {
    for (i, result) in results.iter().enumerate() {
        let field = |key: &str| {
            result
                .record
                .get(key)
                .map_or_else(|| "-".to_string(), ToString::to_string)
        };
        println!(
            "{}. {} - Runs: {}, Avg: {} (distance {:.4})",
            i + 1,
            result.record.known_as().unwrap_or("?"),
            field("runs"),
            field("bat_avg"),
            result.distance
        );
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load()?;
    if let Some(dir) = cli.artifacts_dir {
        settings.artifacts_dir = dir;
    }
    let schema = settings.vector_schema()?;
    let dir = settings.artifacts_dir.as_path();

    match cli.command {
        Commands::Build {
            input,
            format,
            text,
        } => {
            let records = clean_records(read_records(&input)?);
            let partition = partition_by_format(records);
            let formats: Vec<MatchFormat> = match format {
                Some(format) => vec![format],
                None => MatchFormat::ALL.to_vec(),
            };

            let builder = IndexBuilder::new(schema.clone());
            let mut embedder = if text {
                println!("Loading {} (first run downloads the model)...", settings.embedding_model);
                Some(BgeEmbedder::new(settings.embedding_model)?)
            } else {
                None
            };

            for format in formats {
                let records = partition.records(format).to_vec();
                if records.is_empty() {
                    println!("{format}: no records, skipped");
                    continue;
                }

                let pair = builder.build(records.clone())?;
                save_pair(&ArtifactPaths::new(dir, format, ArtifactKind::Stats), &pair, Some(&schema))?;
                println!("{format}: indexed {} players", pair.len());

                if let Some(embedder) = embedder.as_mut() {
                    let pair = TextIndexBuilder::new(embedder).build(records)?;
                    save_pair(&ArtifactPaths::new(dir, format, ArtifactKind::Text), &pair, None)?;
                    println!("{format}: indexed {} player descriptions", pair.len());
                }
            }
            info!(dir = %dir.display(), "build finished");
        }

        Commands::Similar { name, format, k } => {
            let engine = load_engine(dir, format, &schema)?;
            let results = engine.search_by_name(&name, k.unwrap_or(settings.top_k))?;

            println!("\nTop similar players to '{name}' in {format} format:");
            print_results(&results);
        }

        Commands::Ask { query, format, k } => {
            let stored = load_pair(&ArtifactPaths::new(dir, format, ArtifactKind::Text))?;
            println!("Loading {}...", settings.embedding_model);
            let embedder = BgeEmbedder::new(settings.embedding_model)?;
            let mut engine = TextSearchEngine::new(format, embedder, stored.pair);

            let results = engine.search_by_text(&query, k.unwrap_or(settings.top_k))?;

            println!("\nBest matches for '{query}' in {format} format:");
            print_results(&results);
        }

        Commands::Vector { name, format } => {
            let engine = load_engine(dir, format, &schema)?;
            let vector = engine.vector_for(&name)?;

            println!("{name} ({format}):");
            for (key, value) in engine.schema().keys().iter().zip(&vector) {
                println!("  {key:>10}: {value}");
            }
        }
    }

    Ok(())
}
