//! Streaming command - availability lookup for the current catalog.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use cinerank_core::{
    AvailabilitySource, CatalogItem, Config, CrawlController, CrawlOptions, CrawlReport,
    JustWatchClient, SnapshotStore,
};

/// Arguments for the streaming command.
#[derive(Debug, Args)]
pub struct StreamingArgs {
    /// Country code (defaults to the configured country).
    #[arg(long)]
    pub country: Option<String>,

    /// Re-query all items, ignoring recent cache entries.
    #[arg(long)]
    pub force: bool,

    /// Skip items queried within this many days.
    #[arg(long)]
    pub skip_days: Option<i64>,

    /// Delay between upstream calls in seconds.
    #[arg(long)]
    pub delay: Option<f64>,
}

impl StreamingArgs {
    /// Crawl options from config, with command-line overrides applied.
    pub fn crawl_options(&self, config: &Config) -> Result<CrawlOptions> {
        let mut options = CrawlOptions::from_config(&config.availability);
        options.force_refresh = self.force;
        if let Some(country) = &self.country {
            options.country = country.to_uppercase();
        }
        if let Some(days) = self.skip_days {
            options.skip_recent_days = days;
        }
        if let Some(delay) = self.delay {
            options.delay = Duration::try_from_secs_f64(delay)
                .with_context(|| format!("Invalid delay: {}", delay))?;
        }
        Ok(options)
    }
}

/// Execute the streaming command.
pub async fn execute(args: StreamingArgs, config: &Config) -> Result<()> {
    let store = SnapshotStore::new(&config.data.dir);
    let Some(items) = store.load_latest().filter(|items| !items.is_empty()) else {
        bail!("No movie data found. Please run 'cinerank import' first.");
    };

    let options = args.crawl_options(config)?;
    let report = crawl(config, &store, &items, &options).await?;
    print_report(&report);
    Ok(())
}

/// Run one availability crawl against the configured upstream.
pub async fn crawl(
    config: &Config,
    store: &SnapshotStore,
    items: &[CatalogItem],
    options: &CrawlOptions,
) -> Result<CrawlReport> {
    let client = JustWatchClient::new(&config.availability)
        .context("Failed to create availability client")?
        .with_country(options.country.clone());
    let source: Arc<dyn AvailabilitySource> = Arc::new(client);

    let controller = CrawlController::new(source, store.availability_path());
    let report = controller
        .run(items, options)
        .await
        .context("Availability lookup failed")?;

    info!("Availability cache written to {:?}", controller.cache_path());
    Ok(report)
}

pub fn print_report(report: &CrawlReport) {
    println!(
        "Availability lookup finished: {} queried, {} skipped, {} with offers, {} failed",
        report.queried, report.skipped, report.matched, report.failed
    );
}
