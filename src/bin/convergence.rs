//! Convergence CLI: enrich a JSON corpus of embedded documents.
//!
//! Usage:
//!   convergence enrich <INPUT.json> [--config path] [--batch-size n] [--output path] [--compact]
//!   convergence config [--config path]

use clap::{Parser, Subcommand};
use convergence::{BatchOptions, ConvergencePipeline, DocumentRecord, EngineConfig, LoggingObserver};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "convergence",
    version,
    about = "Semantic convergence and intelligence enrichment for embedded documents"
)]
struct Cli {
    /// Path to a YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich a JSON array of document records
    Enrich {
        /// Input file containing document records
        input: PathBuf,
        /// Override the configured chunk size
        #[arg(long)]
        batch_size: Option<usize>,
        /// Write results here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
        /// Emit single-line JSON
        #[arg(long)]
        compact: bool,
    },
    /// Print the effective configuration as YAML
    Config,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("convergence").join("config.yaml"))
}

/// Explicit `--config`, else the per-user file when present, else defaults.
fn load_config(explicit: Option<&Path>) -> Result<EngineConfig, String> {
    if let Some(path) = explicit {
        return EngineConfig::from_file(path).map_err(|e| e.to_string());
    }
    match default_config_path() {
        Some(path) if path.exists() => EngineConfig::from_file(&path).map_err(|e| e.to_string()),
        _ => Ok(EngineConfig::default()),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_enrich(
    config: EngineConfig,
    input: &Path,
    batch_size: Option<usize>,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), String> {
    let pipeline = ConvergencePipeline::new(config).map_err(|e| e.to_string())?;

    let raw = std::fs::read_to_string(input).map_err(|e| format!("failed to read {}: {}", input.display(), e))?;
    let records: Vec<DocumentRecord> =
        serde_json::from_str(&raw).map_err(|e| format!("failed to parse {}: {}", input.display(), e))?;

    let mut observer = LoggingObserver;
    let mut options = BatchOptions::new().with_observer(&mut observer);
    if let Some(size) = batch_size {
        options = options.with_batch_size(size);
    }
    let outcome = pipeline.process_batch(&records, options).map_err(|e| e.to_string())?;

    let json = if compact {
        serde_json::to_string(&outcome)
    } else {
        serde_json::to_string_pretty(&outcome)
    }
    .map_err(|e| format!("failed to serialize results: {}", e))?;

    match output {
        Some(path) => std::fs::write(path, json).map_err(|e| format!("failed to write {}: {}", path.display(), e)),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}

fn cmd_config(config: &EngineConfig) -> Result<(), String> {
    let yaml = serde_yaml::to_string(config).map_err(|e| e.to_string())?;
    print!("{}", yaml);
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Enrich {
            input,
            batch_size,
            output,
            compact,
        } => cmd_enrich(config, &input, batch_size, output.as_deref(), compact),
        Commands::Config => cmd_config(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
