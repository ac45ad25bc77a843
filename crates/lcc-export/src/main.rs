use anyhow::Context;
use clap::{Parser, Subcommand};
use lcc_core::{raw, Aggregator, PgnExport, Route};
use lcc_export::capture_log;
use lcc_export::config::LccConfig;
use lcc_export::output;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lcc-export")]
#[command(about = "Export games captured from the Live Chess Cloud viewer")]
struct Cli {
    /// Configuration file (defaults to ./lcc.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge every captured game into one PGN file
    Pgn {
        /// HAR or JSON-lines capture files, or directories containing them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write every captured payload as a pretty-printed JSON file
    Json {
        /// HAR or JSON-lines capture files, or directories containing them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the captured responses
    List {
        /// HAR or JSON-lines capture files, or directories containing them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => LccConfig::load_from(path),
        None => LccConfig::load(),
    }
    .context("Failed to load configuration")?;

    for line in run(cli.command, &config)? {
        println!("{}", line);
    }
    Ok(())
}

/// Executes a subcommand and returns the lines to print.
fn run(command: Commands, config: &LccConfig) -> anyhow::Result<Vec<String>> {
    match command {
        Commands::Pgn { inputs, output } => {
            let aggregator = capture_log::load_session(&inputs, &config.capture)?;
            let Some(export) = PgnExport::from_aggregator(&aggregator) else {
                return Ok(vec![no_data_message().to_string()]);
            };
            let dir = output.unwrap_or_else(|| config.output_dir.clone());
            let path = output::write_pgn(&dir, &export)?;
            Ok(vec![format!(
                "Wrote merged PGN with {} game(s) to {}",
                export.game_count,
                path.display()
            )])
        }
        Commands::Json { inputs, output } => {
            let aggregator = capture_log::load_session(&inputs, &config.capture)?;
            let files = raw::export(&aggregator);
            if files.is_empty() {
                return Ok(vec![no_data_message().to_string()]);
            }
            let dir = output.unwrap_or_else(|| config.output_dir.clone());
            let paths = output::write_raw(&dir, &files)?;
            Ok(vec![format!(
                "Wrote {} JSON file(s) to {}",
                paths.len(),
                dir.display()
            )])
        }
        Commands::List { inputs } => {
            let aggregator = capture_log::load_session(&inputs, &config.capture)?;
            Ok(listing(&aggregator))
        }
    }
}

fn no_data_message() -> &'static str {
    "No game data captured yet"
}

fn listing(aggregator: &Aggregator) -> Vec<String> {
    let mut lines = vec![format!(
        "{} captured response(s), {} game(s)",
        aggregator.captured_count(),
        aggregator.game_count()
    )];
    lines.extend(aggregator.captured_entries().map(|(url, entry)| {
        format!(
            "{}  {:<10} {}",
            entry.captured_at.format("%Y-%m-%d %H:%M:%S"),
            Route::classify(url).kind(),
            url
        )
    }));
    lines
}
