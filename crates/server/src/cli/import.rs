//! Import command - save freshly scraped records, then look up availability.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use cinerank_core::{CatalogProducer, Config, CrawlOptions, JsonFileProducer, SnapshotStore};

use super::streaming::{crawl, print_report};

/// Arguments for the import command.
#[derive(Debug, Args)]
pub struct ImportArgs {
    /// JSON array of records produced by the scraper.
    pub records: PathBuf,

    /// Snapshot filename (without extension).
    #[arg(long)]
    pub output: Option<String>,

    /// Only import the first N records (for testing).
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Execute the import command.
pub async fn execute(args: ImportArgs, config: &Config) -> Result<()> {
    let producer = JsonFileProducer::new(&args.records).with_limit(args.limit);
    let items = producer
        .produce()
        .with_context(|| format!("Failed to read records from {:?}", args.records))?;

    if items.is_empty() {
        bail!("No movies were found in {:?}", args.records);
    }

    let store = SnapshotStore::new(&config.data.dir);
    match store
        .save_snapshot(&items, args.output.as_deref())
        .context("Failed to save snapshot")?
    {
        Some(saved) => info!("Saved snapshot {}", saved.timestamp),
        None => info!("Catalog unchanged, no snapshot written"),
    }
    println!("Successfully imported {} movies\n", items.len());

    let options = CrawlOptions::from_config(&config.availability);
    let report = crawl(config, &store, &items, &options).await?;
    print_report(&report);
    Ok(())
}
