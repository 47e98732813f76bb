//! Types for the ranked catalog.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::availability::AvailabilityOffer;

/// One ranked entry of the catalog.
///
/// The first block of fields comes from the producer. The overlay fields
/// (`watched`, `streaming_services`, `streaming_services_full`) are derived by
/// the reconciliation cache and are never written back to snapshot files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    /// Position in the ranking (1 = top).
    pub rank: u32,
    pub title: String,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub country: String,
    /// Release year as scraped; may be empty or non-numeric.
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub url: String,
    /// Whether the source site can play the film directly.
    #[serde(default)]
    pub watchable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<NaiveDateTime>,

    /// Present in the user's seen list.
    #[serde(default)]
    pub watched: bool,
    /// Canonical technical names of subscription/free offers.
    #[serde(default)]
    pub streaming_services: Vec<String>,
    /// Reconciled offers, in upstream order.
    #[serde(default)]
    pub streaming_services_full: Vec<AvailabilityOffer>,
}

impl CatalogItem {
    /// Create an item with only producer fields set.
    pub fn new(rank: u32, title: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            rank,
            title: title.into(),
            director: String::new(),
            country: String::new(),
            year: year.into(),
            url: String::new(),
            watchable: false,
            scraped_at: None,
            watched: false,
            streaming_services: Vec::new(),
            streaming_services_full: Vec::new(),
        }
    }

    /// Key used by the availability cache file.
    pub fn availability_key(&self) -> String {
        availability_key(&self.title, &self.year)
    }

    /// Compare producer fields, ignoring `scraped_at` and overlays.
    pub fn same_listing(&self, other: &CatalogItem) -> bool {
        self.rank == other.rank
            && self.title == other.title
            && self.director == other.director
            && self.country == other.country
            && self.year == other.year
            && self.url == other.url
            && self.watchable == other.watchable
    }
}

/// Build the `title|||year` availability key (both parts trimmed).
pub fn availability_key(title: &str, year: &str) -> String {
    format!("{}|||{}", title.trim(), year.trim())
}

/// Errors for snapshot storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<csv::Error> for StoreError {
    fn from(e: csv::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_producer_record() {
        let json = r#"{
            "rank": 1,
            "title": "Jeanne Dielman",
            "director": "Chantal Akerman",
            "country": "Belgium",
            "year": "1975",
            "url": "/films/jeanne-dielman",
            "watchable": true,
            "scraped_at": "2025-01-10T12:34:56.123456"
        }"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.rank, 1);
        assert!(item.watchable);
        assert!(item.scraped_at.is_some());
        assert!(!item.watched);
        assert!(item.streaming_services.is_empty());
    }

    #[test]
    fn test_availability_key_trims() {
        assert_eq!(availability_key(" Stalker ", "1979 "), "Stalker|||1979");
        assert_eq!(CatalogItem::new(3, "Ran", "").availability_key(), "Ran|||");
    }

    #[test]
    fn test_same_listing_ignores_scrape_time_and_overlays() {
        let a = CatalogItem::new(1, "Stalker", "1979");
        let mut b = a.clone();
        b.scraped_at = chrono::NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0));
        b.watched = true;
        assert!(a.same_listing(&b));

        b.rank = 2;
        assert!(!a.same_listing(&b));
    }
}
