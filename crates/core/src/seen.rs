//! Seen-list loading and matching.
//!
//! The seen list is a CSV export of films the user has already watched. The
//! header, when present, is sniffed for title and year columns; otherwise the
//! export layout `Date,Name,Year,...` is assumed.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::{debug, warn};

use crate::catalog::CatalogItem;
use crate::normalize::{alias_closure, normalize};

const DEFAULT_TITLE_COLUMN: usize = 1;
const DEFAULT_YEAR_COLUMN: usize = 2;
const TITLE_HEADERS: &[&str] = &["name", "title", "movie"];

/// Set of (normalized title, year) pairs the user has seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenList {
    entries: HashSet<(String, String)>,
}

impl SeenList {
    /// Load from a CSV file. Missing or unreadable files yield an empty list.
    pub fn load(path: &Path) -> Self {
        match File::open(path) {
            Ok(file) => Self::from_reader(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No seen list at {:?}", path);
                Self::default()
            }
            Err(e) => {
                warn!("Failed to open seen list {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Parse CSV content. Malformed rows are skipped.
    pub fn from_reader<R: Read>(reader: R) -> Self {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = csv_reader.records();

        let mut title_col = DEFAULT_TITLE_COLUMN;
        let mut year_col = DEFAULT_YEAR_COLUMN;

        // The first row is always consumed as the header, recognised or not.
        match records.next() {
            Some(Ok(header)) => {
                for (i, column) in header.iter().enumerate() {
                    let column = column.trim().to_lowercase();
                    if TITLE_HEADERS.contains(&column.as_str()) {
                        title_col = i;
                    } else if column == "year" {
                        year_col = i;
                    }
                }
            }
            Some(Err(e)) => warn!("Malformed seen list header: {}", e),
            None => return Self::default(),
        }

        let mut entries = HashSet::new();
        for record in records {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping malformed seen list row: {}", e);
                    continue;
                }
            };

            let title = match record.get(title_col) {
                Some(title) if !title.trim().is_empty() => title.trim(),
                _ => continue,
            };
            let year = record.get(year_col).unwrap_or("").trim();
            entries.insert((normalize(title), year.to_string()));
        }

        Self { entries }
    }

    /// Build directly from (title, year) pairs; titles are normalized.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(title, year)| (normalize(title), year.trim().to_string()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any alias of the item's title, with the item's year, is seen.
    pub fn contains(&self, item: &CatalogItem) -> bool {
        let year = item.year.trim();
        alias_closure(&normalize(&item.title))
            .into_iter()
            .any(|variant| self.entries.contains(&(variant, year.to_string())))
    }
}
