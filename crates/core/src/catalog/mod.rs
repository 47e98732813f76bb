//! Ranked catalog - items, producers and snapshot storage.
//!
//! The scraper that turns the live list into records lives outside this
//! crate; it is consumed through the [`CatalogProducer`] trait.

mod store;
mod types;

pub use store::*;
pub use types::*;

use std::path::PathBuf;

use tracing::info;

/// Source of freshly scraped catalog records.
pub trait CatalogProducer: Send + Sync {
    /// Produce the full ranked list, in rank order.
    fn produce(&self) -> Result<Vec<CatalogItem>, StoreError>;
}

/// Producer reading records a scraper dumped as a JSON array.
pub struct JsonFileProducer {
    path: PathBuf,
    limit: Option<usize>,
}

impl JsonFileProducer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            limit: None,
        }
    }

    /// Only keep the first `limit` records (for testing runs).
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

impl CatalogProducer for JsonFileProducer {
    fn produce(&self) -> Result<Vec<CatalogItem>, StoreError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(self.path.display().to_string())
            } else {
                StoreError::Io(e)
            }
        })?;

        let mut items: Vec<CatalogItem> = serde_json::from_str(&content)?;
        // Producers hand over raw records; overlay fields never come from them.
        for item in &mut items {
            item.watched = false;
            item.streaming_services.clear();
            item.streaming_services_full.clear();
        }
        if let Some(limit) = self.limit {
            items.truncate(limit);
        }

        info!("Produced {} catalog records from {:?}", items.len(), self.path);
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_json_producer_applies_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(
            &path,
            r#"[
                {"rank": 1, "title": "A", "year": "1990", "watched": true},
                {"rank": 2, "title": "B", "year": "1991"},
                {"rank": 3, "title": "C", "year": "1992"}
            ]"#,
        )
        .unwrap();

        let items = JsonFileProducer::new(&path)
            .with_limit(Some(2))
            .produce()
            .unwrap();
        assert_eq!(items.len(), 2);
        assert!(!items[0].watched);
    }

    #[test]
    fn test_json_producer_missing_file() {
        let result = JsonFileProducer::new("/nonexistent/records.json").produce();
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
