//! NextLevel CLI - Command-line interface for Next Level Games archives

pub mod commands;
pub mod progress;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use commands::Commands;
use tracing_subscriber::EnvFilter;

use crate::formats::common::HashNames;

#[derive(Parser)]
#[command(name = "nextlevel")]
#[command(about = "NextLevel: DICT/DATA archive tools for Luigi's Mansion 2", long_about = None)]
#[command(version)]
struct Cli {
    /// Hash name table (`hash:name` per line) used to label scripts and functions
    #[arg(long, global = true)]
    hashes: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Run the NextLevel CLI
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG wins over -v
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    if let Some(path) = &cli.hashes {
        let names = HashNames::load(path)
            .with_context(|| format!("Failed to load hash names from {}", path.display()))?;
        if !names.install_global() {
            tracing::warn!("Hash names were already installed, ignoring {}", path.display());
        }
    }

    cli.command.execute()?;

    Ok(())
}
