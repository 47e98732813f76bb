//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Availability crawl (queries, skips, checkpoints)
//! - Upstream search calls
//! - Reconciliation cache layer reloads

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Crawl Metrics
// =============================================================================

/// Upstream queries issued by the crawl, by result.
pub static CRAWL_QUERIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("cinerank_crawl_queries_total", "Total availability queries"),
        &["result"], // "matched", "unmatched", "failed"
    )
    .unwrap()
});

/// Items skipped because their cache entry is recent.
pub static CRAWL_SKIPPED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "cinerank_crawl_skipped_total",
        "Total items skipped as recently queried",
    )
    .unwrap()
});

/// Cache file flushes during and at the end of a crawl.
pub static CRAWL_CHECKPOINTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "cinerank_crawl_checkpoints_total",
            "Total availability cache flushes",
        ),
        &["status"], // "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Upstream Metrics
// =============================================================================

/// Upstream search duration.
pub static UPSTREAM_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "cinerank_upstream_duration_seconds",
            "Duration of availability source searches",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["status"],
    )
    .unwrap()
});

/// Candidates returned per upstream search.
pub static SEARCH_CANDIDATES: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "cinerank_search_candidates",
            "Number of candidates returned per search",
        )
        .buckets(vec![0.0, 1.0, 2.0, 3.0, 5.0, 10.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Reconciliation Cache Metrics
// =============================================================================

/// Layer recomputations, by layer.
pub static CACHE_RELOADS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "cinerank_cache_reloads_total",
            "Total reconciliation cache layer reloads",
        ),
        &["layer"], // "catalog", "seen", "availability"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Crawl
        Box::new(CRAWL_QUERIES.clone()),
        Box::new(CRAWL_SKIPPED.clone()),
        Box::new(CRAWL_CHECKPOINTS.clone()),
        // Upstream
        Box::new(UPSTREAM_DURATION.clone()),
        Box::new(SEARCH_CANDIDATES.clone()),
        // Cache
        Box::new(CACHE_RELOADS.clone()),
    ]
}
