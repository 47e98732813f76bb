//! Mock availability source for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::availability::{AvailabilityError, AvailabilitySource, SearchCandidate};

/// Mock implementation of the AvailabilitySource trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable candidates per query
/// - Track queries for assertions
/// - Simulate failures, once or for specific titles
///
/// # Example
///
/// ```rust,ignore
/// use cinerank_core::testing::{MockAvailabilitySource, fixtures};
///
/// let source = MockAvailabilitySource::new();
/// source
///     .set_results("Stalker", vec![fixtures::search_candidate("Stalker", 1979, &["max"])])
///     .await;
///
/// let results = source.search("Stalker").await?;
/// assert_eq!(results.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockAvailabilitySource {
    /// Candidates by exact query string.
    results: Arc<RwLock<HashMap<String, Vec<SearchCandidate>>>>,
    /// Queries that always fail.
    failing: Arc<RwLock<HashSet<String>>>,
    /// Recorded queries.
    queries: Arc<RwLock<Vec<String>>>,
    /// If set, the next search will fail with this error.
    next_error: Arc<RwLock<Option<AvailabilityError>>>,
}

impl Default for MockAvailabilitySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAvailabilitySource {
    /// Create a mock that returns no candidates for any query.
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(HashMap::new())),
            failing: Arc::new(RwLock::new(HashSet::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    // =========================================================================
    // Results Configuration
    // =========================================================================

    /// Set the candidates returned for a query.
    pub async fn set_results(&self, query: &str, candidates: Vec<SearchCandidate>) {
        self.results
            .write()
            .await
            .insert(query.to_string(), candidates);
    }

    /// Clear all configured results.
    pub async fn clear_results(&self) {
        self.results.write().await.clear();
    }

    // =========================================================================
    // Query Recording
    // =========================================================================

    /// Get all recorded queries, in call order.
    pub async fn recorded_queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }

    /// Get the number of queries performed.
    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next search to fail with the given error.
    pub async fn set_next_error(&self, error: AvailabilityError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every search for `query` fail.
    pub async fn fail_query(&self, query: &str) {
        self.failing.write().await.insert(query.to_string());
    }
}

#[async_trait]
impl AvailabilitySource for MockAvailabilitySource {
    async fn search(&self, title: &str) -> Result<Vec<SearchCandidate>, AvailabilityError> {
        self.queries.write().await.push(title.to_string());

        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        if self.failing.read().await.contains(title) {
            return Err(AvailabilityError::ApiError {
                status: 503,
                message: "mock upstream failure".to_string(),
            });
        }

        Ok(self
            .results
            .read()
            .await
            .get(title)
            .cloned()
            .unwrap_or_default())
    }
}
