//! Testing utilities and mock implementations.
//!
//! Provides a mock of the upstream availability source and fixtures for
//! catalog items, so crawls and caches can be tested without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use cinerank_core::testing::{fixtures, MockAvailabilitySource};
//!
//! let source = MockAvailabilitySource::new();
//! source.set_results("Ran", vec![fixtures::search_candidate("Ran", 1985, &["max"])]).await;
//!
//! // Use in a CrawlController...
//! ```

mod mock_availability;

pub use mock_availability::MockAvailabilitySource;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::availability::{AvailabilityOffer, MonetizationType, SearchCandidate};
    use crate::catalog::CatalogItem;

    /// Create a catalog item with director and country filled in.
    pub fn catalog_item(rank: u32, title: &str, year: &str) -> CatalogItem {
        let mut item = CatalogItem::new(rank, title, year);
        item.director = format!("Director of {}", title);
        item.country = "France".to_string();
        item.url = format!("/films/{}", title.to_lowercase().replace(' ', "-"));
        item
    }

    /// Create a ranked list from titles; ranks follow list order.
    pub fn ranked_list(entries: &[(&str, &str)]) -> Vec<CatalogItem> {
        entries
            .iter()
            .enumerate()
            .map(|(i, (title, year))| catalog_item(i as u32 + 1, title, year))
            .collect()
    }

    /// Create a subscription offer.
    pub fn flatrate_offer(technical_name: &str) -> AvailabilityOffer {
        AvailabilityOffer::new(
            display_name(technical_name),
            technical_name,
            MonetizationType::Flatrate,
        )
    }

    /// Create a movie search candidate with subscription offers.
    pub fn search_candidate(title: &str, year: i32, services: &[&str]) -> SearchCandidate {
        SearchCandidate {
            object_type: Some("MOVIE".to_string()),
            title: title.to_string(),
            release_year: Some(year),
            entry_id: Some(format!("tm{}", year * 10 + title.len() as i32)),
            offers: services.iter().map(|s| flatrate_offer(s)).collect(),
        }
    }

    fn display_name(technical_name: &str) -> String {
        let mut chars = technical_name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
