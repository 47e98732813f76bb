//! Third-party availability lookup: upstream search, best-match selection
//! and offer reconciliation.

mod justwatch;
pub mod matcher;
pub mod policy;
mod types;

pub use justwatch::{JustWatchClient, DEFAULT_ENDPOINT};
pub use matcher::{match_title, select_best_match, MatchOutcome};
pub use policy::reconcile_offers;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when querying an availability source.
#[derive(Debug, Error)]
pub enum AvailabilityError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Client not configured.
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Source of search candidates for a title.
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    /// Search by free-text title; results come back in upstream order.
    async fn search(&self, title: &str) -> Result<Vec<SearchCandidate>, AvailabilityError>;
}
