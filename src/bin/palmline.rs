//! palmline - attribute extraction and interpretation from the command line

use anyhow::Context;
use clap::{Parser, Subcommand};
use palmline::config::PalmConfig;
use palmline::dataset::{extract_records, CocoDataset};
use palmline::decode::HeadProbabilities;
use palmline::geometry::GeometryExtractor;
use palmline::reader::PalmReader;
use palmline::storage::AttributeTable;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Palm-line geometry extraction and rule-based interpretation
#[derive(Parser, Debug)]
#[command(name = "palmline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract the per-annotation attribute table from a COCO export
    Extract {
        /// COCO annotation file
        #[arg(short, long)]
        annotations: PathBuf,

        /// Output Parquet file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Interpret classifier probabilities for an asserted line type
    Interpret {
        /// Asserted line type (life, heart, head, fate)
        #[arg(short, long)]
        line_type: String,

        /// JSON file with the five probability vectors
        #[arg(short, long)]
        probs: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = match &cli.config {
        Some(path) => PalmConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PalmConfig::default(),
    };

    match cli.command {
        Commands::Extract {
            annotations,
            output,
        } => run_extract(&annotations, &output, &config),
        Commands::Interpret { line_type, probs } => run_interpret(&line_type, &probs, &config),
        Commands::Config => {
            println!("{}", config.to_json_pretty()?);
            Ok(())
        }
    }
}

fn run_extract(annotations: &Path, output: &Path, config: &PalmConfig) -> anyhow::Result<()> {
    let dataset = CocoDataset::load(annotations)
        .with_context(|| format!("reading annotations {}", annotations.display()))?;
    let extractor = GeometryExtractor::new(config.padding)?;

    let table = AttributeTable::new(extract_records(&dataset, &extractor)?);
    table
        .write_parquet(output)
        .with_context(|| format!("writing {}", output.display()))?;

    info!(rows = table.len(), output = %output.display(), "extraction complete");
    Ok(())
}

fn run_interpret(line_type: &str, probs: &Path, config: &PalmConfig) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(probs)
        .with_context(|| format!("reading probabilities {}", probs.display()))?;
    let probs: HeadProbabilities =
        serde_json::from_str(&text).context("parsing probability vectors")?;

    let reader = PalmReader::new(config)?;
    let reading = reader.read(line_type, &probs)?;
    println!("{}", serde_json::to_string_pretty(&reading)?);
    Ok(())
}
