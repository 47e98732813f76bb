//! Types for the availability crawl.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AvailabilityConfig;

/// Errors that end a crawl.
///
/// Per-item upstream failures never do; they are recorded as empty entries.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The final cache flush failed.
    #[error("failed to write availability cache: {0}")]
    Flush(#[from] std::io::Error),

    #[error("invalid crawl options: {0}")]
    InvalidOptions(String),
}

/// Options for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Query every item, ignoring recent cache entries.
    pub force_refresh: bool,
    /// Entries younger than this many whole days are not re-queried.
    pub skip_recent_days: i64,
    /// Pause after every upstream query.
    pub delay: Duration,
    /// Flush the cache file after this many queries.
    pub checkpoint_interval: usize,
    /// Country recorded in the cache metadata.
    pub country: String,
}

impl CrawlOptions {
    pub fn from_config(config: &AvailabilityConfig) -> Self {
        Self {
            force_refresh: false,
            skip_recent_days: config.skip_recent_days,
            delay: Duration::from_millis(config.delay_ms),
            checkpoint_interval: config.checkpoint_interval,
            country: config.country.to_uppercase(),
        }
    }
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self::from_config(&AvailabilityConfig::default())
    }
}

/// Summary of a finished crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlReport {
    /// Catalog items visited.
    pub total: usize,
    /// Items sent to the upstream source.
    pub queried: usize,
    /// Items skipped as recently queried.
    pub skipped: usize,
    /// Items with at least one offer, queried or skipped.
    pub matched: usize,
    /// Queries that failed upstream.
    pub failed: usize,
    /// Successful cache flushes, including the final one.
    pub checkpoints: usize,
}
