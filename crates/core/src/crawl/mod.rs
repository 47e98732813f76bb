//! Resumable availability crawl over the whole catalog.
//!
//! The crawl is strictly sequential:
//! - **Skip**: items with a cache entry younger than `skip_recent_days`
//! - **Query**: one upstream search at a time, followed by a fixed delay
//! - **Checkpoint**: the whole cache file is replaced every N queries and at the end
//!
//! An interrupted crawl resumes by re-running it; recently written entries
//! are skipped.

mod controller;
mod types;

pub use controller::CrawlController;
pub use types::{CrawlError, CrawlOptions, CrawlReport};
