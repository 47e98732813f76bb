//! Crawl controller implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};

use super::types::{CrawlError, CrawlOptions, CrawlReport};
use crate::availability::{
    match_title, AvailabilityCacheEntry, AvailabilityCacheFile, AvailabilitySource, CrawlMetadata,
    MatchOutcome,
};
use crate::catalog::CatalogItem;
use crate::metrics;

/// Drives an availability source across the catalog and maintains the
/// availability cache file.
pub struct CrawlController {
    source: Arc<dyn AvailabilitySource>,
    cache_path: PathBuf,
}

impl CrawlController {
    pub fn new(source: Arc<dyn AvailabilitySource>, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            source,
            cache_path: cache_path.into(),
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Visit every item once, in catalog order.
    ///
    /// Previously cached entries for items not in `items` are kept.
    pub async fn run(
        &self,
        items: &[CatalogItem],
        options: &CrawlOptions,
    ) -> Result<CrawlReport, CrawlError> {
        if options.checkpoint_interval == 0 {
            return Err(CrawlError::InvalidOptions(
                "checkpoint_interval must be at least 1".to_string(),
            ));
        }

        let mut cache = AvailabilityCacheFile::load(&self.cache_path);
        let now = Local::now().naive_local();
        let total = items.len();
        let mut report = CrawlReport {
            total,
            ..Default::default()
        };

        info!(
            "Looking up availability for {} items (country: {}, delay: {:?})",
            total, options.country, options.delay
        );
        if !options.force_refresh {
            info!(
                "Skipping items queried within {} days",
                options.skip_recent_days
            );
        }

        for (i, item) in items.iter().enumerate() {
            let key = item.availability_key();

            if !options.force_refresh {
                if let Some(entry) = cache.movies.get(&key) {
                    if is_recent(entry, now, options.skip_recent_days) {
                        report.skipped += 1;
                        metrics::CRAWL_SKIPPED.inc();
                        if !entry.services.is_empty() {
                            report.matched += 1;
                        }
                        continue;
                    }
                }
            }

            let outcome = self.lookup(item, &mut report).await;
            report.queried += 1;

            if outcome.services.is_empty() {
                info!(
                    "[{}/{}] {} ({}) -> No streaming found",
                    i + 1,
                    total,
                    item.title,
                    item.year
                );
            } else {
                report.matched += 1;
                let names: Vec<&str> = outcome.services.iter().map(|s| s.name.as_str()).collect();
                info!(
                    "[{}/{}] {} ({}) -> {}",
                    i + 1,
                    total,
                    item.title,
                    item.year,
                    names.join(", ")
                );
            }

            cache.movies.insert(
                key,
                AvailabilityCacheEntry {
                    services: outcome.services,
                    external_id: outcome.external_id,
                    last_updated: Some(Local::now().naive_local()),
                },
            );

            if report.queried % options.checkpoint_interval == 0 {
                match self.flush(&mut cache, options, total, report.matched) {
                    Ok(()) => report.checkpoints += 1,
                    Err(e) => warn!("Checkpoint after {} queries failed: {}", report.queried, e),
                }
            }

            if !options.delay.is_zero() {
                tokio::time::sleep(options.delay).await;
            }
        }

        self.flush(&mut cache, options, total, report.matched)?;
        report.checkpoints += 1;

        info!(
            "Crawl done: queried {}, skipped {}, failed {}, with streaming {}/{}",
            report.queried, report.skipped, report.failed, report.matched, total
        );
        Ok(report)
    }

    /// Query the source for one item. Upstream failures become a non-match.
    async fn lookup(&self, item: &CatalogItem, report: &mut CrawlReport) -> MatchOutcome {
        let started = Instant::now();
        let result = self.source.search(&item.title).await;
        let elapsed = started.elapsed().as_secs_f64();

        match result {
            Ok(candidates) => {
                metrics::UPSTREAM_DURATION
                    .with_label_values(&["success"])
                    .observe(elapsed);
                metrics::SEARCH_CANDIDATES
                    .with_label_values(&[])
                    .observe(candidates.len() as f64);

                let outcome = match_title(&candidates, &item.title, &item.year);
                let label = if outcome.services.is_empty() {
                    "unmatched"
                } else {
                    "matched"
                };
                metrics::CRAWL_QUERIES.with_label_values(&[label]).inc();
                outcome
            }
            Err(e) => {
                metrics::UPSTREAM_DURATION
                    .with_label_values(&["error"])
                    .observe(elapsed);
                metrics::CRAWL_QUERIES.with_label_values(&["failed"]).inc();
                warn!("Availability lookup failed for '{}': {}", item.title, e);
                report.failed += 1;
                MatchOutcome::default()
            }
        }
    }

    fn flush(
        &self,
        cache: &mut AvailabilityCacheFile,
        options: &CrawlOptions,
        total: usize,
        matched: usize,
    ) -> std::io::Result<()> {
        cache.metadata = CrawlMetadata {
            country: Some(options.country.clone()),
            last_full_run: Some(Local::now().naive_local()),
            total_queried: total,
            total_matched: matched,
        };

        let result = cache.save(&self.cache_path);
        let status = if result.is_ok() { "success" } else { "error" };
        metrics::CRAWL_CHECKPOINTS.with_label_values(&[status]).inc();
        result
    }
}

fn is_recent(entry: &AvailabilityCacheEntry, now: NaiveDateTime, skip_recent_days: i64) -> bool {
    entry
        .last_updated
        .map_or(false, |last| (now - last).num_days() < skip_recent_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::AvailabilityError;
    use crate::testing::{fixtures, MockAvailabilitySource};
    use chrono::Duration as ChronoDuration;
    use std::time::Duration;
    use tempfile::TempDir;

    fn options() -> CrawlOptions {
        CrawlOptions {
            force_refresh: false,
            skip_recent_days: 7,
            delay: Duration::ZERO,
            checkpoint_interval: 50,
            country: "US".to_string(),
        }
    }

    fn seed_cache(path: &Path, key: &str, age_days: i64, services: &[&str]) {
        let mut cache = AvailabilityCacheFile::default();
        cache.movies.insert(
            key.to_string(),
            AvailabilityCacheEntry {
                services: services.iter().map(|s| fixtures::flatrate_offer(s)).collect(),
                external_id: Some("tm1".to_string()),
                last_updated: Some(Local::now().naive_local() - ChronoDuration::days(age_days)),
            },
        );
        cache.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_recent_entry_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("streaming.json");
        seed_cache(&path, "Stalker|||1979", 3, &["max"]);

        let source = Arc::new(MockAvailabilitySource::new());
        let controller = CrawlController::new(source.clone(), &path);
        let items = fixtures::ranked_list(&[("Stalker", "1979")]);

        let report = controller.run(&items, &options()).await.unwrap();
        assert_eq!(source.query_count().await, 0);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.queried, 0);
        assert_eq!(report.matched, 1);

        let force = CrawlOptions {
            force_refresh: true,
            ..options()
        };
        let report = controller.run(&items, &force).await.unwrap();
        assert_eq!(source.query_count().await, 1);
        assert_eq!(report.queried, 1);
        assert_eq!(report.skipped, 0);
    }

    #[tokio::test]
    async fn test_stale_entry_requeried() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("streaming.json");
        seed_cache(&path, "Stalker|||1979", 10, &["max"]);

        let source = Arc::new(MockAvailabilitySource::new());
        source
            .set_results(
                "Stalker",
                vec![fixtures::search_candidate("Stalker", 1979, &["mubi"])],
            )
            .await;
        let controller = CrawlController::new(source.clone(), &path);
        let items = fixtures::ranked_list(&[("Stalker", "1979")]);

        let report = controller.run(&items, &options()).await.unwrap();
        assert_eq!(report.queried, 1);
        assert_eq!(report.matched, 1);

        let cache = AvailabilityCacheFile::load(&path);
        let entry = &cache.movies["Stalker|||1979"];
        assert_eq!(entry.services[0].technical_name, "mubi");
        assert_eq!(cache.metadata.country.as_deref(), Some("US"));
        assert_eq!(cache.metadata.total_queried, 1);
        assert_eq!(cache.metadata.total_matched, 1);
    }

    #[tokio::test]
    async fn test_unparsable_timestamp_requeried() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("streaming.json");
        std::fs::write(
            &path,
            r#"{"metadata": {}, "movies": {"Ran|||1985": {"services": [], "justwatch_id": null, "last_updated": "garbage"}}}"#,
        )
        .unwrap();

        let source = Arc::new(MockAvailabilitySource::new());
        let controller = CrawlController::new(source.clone(), &path);
        let items = fixtures::ranked_list(&[("Ran", "1985")]);

        let report = controller.run(&items, &options()).await.unwrap();
        assert_eq!(report.queried, 1);
        assert_eq!(source.recorded_queries().await, vec!["Ran"]);
    }

    #[tokio::test]
    async fn test_checkpoints_every_interval_and_at_end() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("streaming.json");

        let source = Arc::new(MockAvailabilitySource::new());
        let controller = CrawlController::new(source, &path);
        let items =
            fixtures::ranked_list(&[("A", "1"), ("B", "2"), ("C", "3"), ("D", "4"), ("E", "5")]);

        let opts = CrawlOptions {
            checkpoint_interval: 2,
            ..options()
        };
        let report = controller.run(&items, &opts).await.unwrap();
        assert_eq!(report.queried, 5);
        assert_eq!(report.checkpoints, 3);

        let cache = AvailabilityCacheFile::load(&path);
        assert_eq!(cache.movies.len(), 5);
        assert_eq!(cache.metadata.total_queried, 5);
        assert_eq!(cache.metadata.total_matched, 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_empty_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("streaming.json");

        let source = Arc::new(MockAvailabilitySource::new());
        source
            .set_results("A", vec![fixtures::search_candidate("A", 1990, &["max"])])
            .await;
        source
            .set_results("B", vec![fixtures::search_candidate("B", 1991, &["max"])])
            .await;
        source.fail_query("B").await;
        source
            .set_results("C", vec![fixtures::search_candidate("C", 1992, &["mubi"])])
            .await;

        let controller = CrawlController::new(source.clone(), &path);
        let items = fixtures::ranked_list(&[("A", "1990"), ("B", "1991"), ("C", "1992")]);

        let report = controller.run(&items, &options()).await.unwrap();
        assert_eq!(report.queried, 3);
        assert_eq!(report.failed, 1);
        assert_eq!(report.matched, 2);

        let cache = AvailabilityCacheFile::load(&path);
        let failed = &cache.movies["B|||1991"];
        assert!(failed.services.is_empty());
        assert!(failed.external_id.is_none());
        assert!(failed.last_updated.is_some());
    }

    #[tokio::test]
    async fn test_rate_limit_does_not_stop_crawl() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("streaming.json");

        let source = Arc::new(MockAvailabilitySource::new());
        source.set_next_error(AvailabilityError::RateLimitExceeded).await;
        let controller = CrawlController::new(source.clone(), &path);
        let items = fixtures::ranked_list(&[("A", "1990"), ("B", "1991")]);

        let report = controller.run(&items, &options()).await.unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(source.query_count().await, 2);
    }

    #[tokio::test]
    async fn test_zero_checkpoint_interval_rejected() {
        let dir = TempDir::new().unwrap();
        let controller = CrawlController::new(
            Arc::new(MockAvailabilitySource::new()),
            dir.path().join("streaming.json"),
        );
        let opts = CrawlOptions {
            checkpoint_interval: 0,
            ..options()
        };
        assert!(matches!(
            controller.run(&[], &opts).await,
            Err(CrawlError::InvalidOptions(_))
        ));
    }

    #[tokio::test]
    async fn test_entries_outside_catalog_preserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("streaming.json");
        seed_cache(&path, "Gone|||1960", 30, &["max"]);

        let controller = CrawlController::new(Arc::new(MockAvailabilitySource::new()), &path);
        let items = fixtures::ranked_list(&[("Ran", "1985")]);
        controller.run(&items, &options()).await.unwrap();

        let cache = AvailabilityCacheFile::load(&path);
        assert!(cache.movies.contains_key("Gone|||1960"));
        assert!(cache.movies.contains_key("Ran|||1985"));
    }

    #[tokio::test]
    async fn test_malformed_entry_does_not_wipe_cache() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("streaming.json");
        seed_cache(&path, "Gone|||1960", 30, &["max"]);

        let mut raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        raw["movies"]["Odd|||1970"] = serde_json::json!({"services": [], "last_updated": 12345});
        raw["movies"]["Broken|||1971"] = serde_json::json!({"services": "netflix"});
        std::fs::write(&path, raw.to_string()).unwrap();

        let controller = CrawlController::new(Arc::new(MockAvailabilitySource::new()), &path);
        let items = fixtures::ranked_list(&[("Ran", "1985")]);
        controller.run(&items, &options()).await.unwrap();

        let cache = AvailabilityCacheFile::load(&path);
        assert_eq!(cache.movies["Gone|||1960"].services.len(), 1);
        assert!(cache.movies.contains_key("Odd|||1970"));
        assert!(cache.movies.contains_key("Ran|||1985"));
        assert!(!cache.movies.contains_key("Broken|||1971"));
    }
}
