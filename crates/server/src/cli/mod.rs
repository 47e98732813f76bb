//! Command-line interface for the `cinerank` binary.
//!
//! ## Commands
//!
//! - `cinerank import` - Save scraped records as a snapshot, then look up availability
//! - `cinerank streaming` - Look up streaming availability for the current catalog
//! - `cinerank compare` - Diff the two most recent snapshots
//! - `cinerank random` - Print a random catalog entry
//! - `cinerank search` - Search the catalog
//! - `cinerank serve` - Run the HTTP server
//!
//! ## Configuration
//!
//! Settings come from a TOML file (`CINERANK_CONFIG`, default `config.toml`)
//! with `CINERANK_`-prefixed environment overrides.

pub mod browse;
pub mod compare;
pub mod import;
pub mod serve;
pub mod streaming;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use cinerank_core::{load_config, validate_config, Config};

/// Ranked film catalog tracker.
#[derive(Debug, Parser)]
#[command(name = "cinerank")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file.
    #[arg(long, env = "CINERANK_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Load and validate the configuration file.
    pub fn load_config(&self) -> Result<Config> {
        info!("Loading configuration from {:?}", self.config);
        let config = load_config(&self.config)
            .with_context(|| format!("Failed to load config from {:?}", self.config))?;
        validate_config(&config).context("Configuration validation failed")?;
        Ok(config)
    }
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Save scraped records as a new snapshot and look up availability.
    Import(import::ImportArgs),
    /// Look up streaming availability for the current catalog.
    Streaming(streaming::StreamingArgs),
    /// Compare the two most recent snapshots.
    Compare,
    /// Print a random catalog entry.
    Random,
    /// Search titles, directors, countries and years.
    Search(browse::SearchArgs),
    /// Run the HTTP server.
    Serve(serve::ServeArgs),
}

/// Run one subcommand to completion.
pub async fn execute(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Import(args) => import::execute(args, &config).await,
        Commands::Streaming(args) => streaming::execute(args, &config).await,
        Commands::Compare => compare::execute(&config),
        Commands::Random => browse::random(&config),
        Commands::Search(args) => browse::search(&args, &config),
        Commands::Serve(args) => serve::execute(args, config).await,
    }
}
