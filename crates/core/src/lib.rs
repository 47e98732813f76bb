pub mod availability;
pub mod catalog;
pub mod config;
pub mod crawl;
pub mod diff;
pub mod metrics;
pub mod normalize;
pub mod persist;
pub mod query;
pub mod reconcile;
pub mod seen;
pub mod services;
pub mod testing;

pub use availability::{
    AvailabilityCacheEntry, AvailabilityCacheFile, AvailabilityError, AvailabilityOffer,
    AvailabilitySource, JustWatchClient, MonetizationType, SearchCandidate,
};
pub use catalog::{CatalogItem, CatalogProducer, JsonFileProducer, SnapshotStore, StoreError};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use crawl::{CrawlController, CrawlError, CrawlOptions, CrawlReport};
pub use diff::{compare_snapshots, diff, ChangeSet, ChangeSummary, Comparison, DiffError};
pub use query::{CatalogFilter, QueryError};
pub use reconcile::{CachePaths, ReconciliationCache};
pub use seen::SeenList;
pub use services::UserServices;
