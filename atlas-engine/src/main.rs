//! atlas-engine - build a snapshot from an input bundle and run one query
//!
//! Reads a JSON [`SnapshotInputs`] bundle, builds and verifies a snapshot,
//! runs `retrieve` and prints the [`RecommendationResult`] as JSON on stdout.
//! Nothing is written to disk.
//!
//! [`RecommendationResult`]: atlas_engine::RecommendationResult

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use atlas_common::config::{AtlasConfig, ConfigResolver};
use atlas_common::ids::parse_artist_ids;
use atlas_common::ArtistId;
use atlas_engine::{EngineSnapshot, HybridRetrievalEngine, RetrievalOptions, SnapshotInputs, SnapshotStore};
use clap::Parser;
use tracing::{info, warn};

/// Command-line arguments for atlas-engine
#[derive(Parser, Debug)]
#[command(name = "atlas-engine")]
#[command(about = "Hybrid taste/structure artist recommendations")]
#[command(version)]
struct Args {
    /// Config file (overrides ATLAS_CONFIG and the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON input bundle (tags, relations, areas, redirects, names)
    #[arg(short, long, env = "ATLAS_INPUTS")]
    inputs: PathBuf,

    /// Seed artist ids, comma or whitespace separated, brackets allowed
    #[arg(short, long, default_value = "")]
    seeds: String,

    /// Seed artist names, comma separated
    #[arg(long, value_delimiter = ',')]
    seed_names: Vec<String>,

    /// Result list size (defaults to [query].default_limit)
    #[arg(short, long)]
    limit: Option<usize>,

    /// Attach structure reasons without boosting scores
    #[arg(long)]
    no_rerank: bool,

    /// Query budget in milliseconds (defaults to [query].timeout_ms)
    #[arg(long)]
    timeout_ms: Option<u64>,
}

fn init_tracing(config: &AtlasConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match &config.logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ConfigResolver::new(args.config.clone())
        .load()
        .context("Failed to load configuration")?;
    init_tracing(&config)?;

    info!("Starting atlas-engine v{}", env!("CARGO_PKG_VERSION"));

    let inputs = SnapshotInputs::load(&args.inputs)
        .with_context(|| format!("Failed to load input bundle {}", args.inputs.display()))?;

    let snapshot = EngineSnapshot::build(inputs, &config).context("Snapshot build failed")?;
    info!(stats = ?snapshot.stats(), "Snapshot ready");

    let mut seeds: Vec<ArtistId> = if args.seeds.trim().is_empty() {
        Vec::new()
    } else {
        parse_artist_ids(&args.seeds)?
    };
    for name in args.seed_names.iter().filter(|n| !n.trim().is_empty()) {
        match snapshot.identity().resolve_name(name) {
            Some(id) => seeds.push(id),
            None => warn!(name = %name, "Seed name did not resolve"),
        }
    }

    let store = Arc::new(SnapshotStore::new(snapshot)?);
    let engine = HybridRetrievalEngine::new(store);

    let mut options = RetrievalOptions::new(
        args.limit.unwrap_or(config.query.default_limit),
        !args.no_rerank,
    );
    if let Some(ms) = args.timeout_ms {
        options = options.with_timeout(Duration::from_millis(ms));
    }

    let result = engine.retrieve_with(&seeds, options).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
