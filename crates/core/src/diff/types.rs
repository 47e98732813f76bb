//! Types for snapshot comparison.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::CatalogItem;

/// Errors for comparison requests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiffError {
    #[error("Not enough historical data for comparison")]
    NotEnoughSnapshots,

    #[error("Invalid snapshot timestamp: {0}")]
    UnknownSnapshot(String),
}

/// An entry present in both snapshots at different ranks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovedEntry {
    pub title: String,
    pub director: String,
    pub year: String,
    pub old_rank: u32,
    pub new_rank: u32,
    /// Absolute rank difference.
    pub change: u32,
}

/// Every non-excluded title of two snapshots, in exactly one bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub added: Vec<CatalogItem>,
    pub removed: Vec<CatalogItem>,
    pub moved_up: Vec<MovedEntry>,
    pub moved_down: Vec<MovedEntry>,
    pub unchanged: Vec<CatalogItem>,
}

impl ChangeSet {
    pub fn summary(&self) -> ChangeSummary {
        ChangeSummary {
            total_added: self.added.len(),
            total_removed: self.removed.len(),
            total_moved_up: self.moved_up.len(),
            total_moved_down: self.moved_down.len(),
            total_unchanged: self.unchanged.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.moved_up.is_empty()
            && self.moved_down.is_empty()
            && self.unchanged.is_empty()
    }
}

/// Bucket sizes of a [`ChangeSet`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub total_added: usize,
    pub total_removed: usize,
    pub total_moved_up: usize,
    pub total_moved_down: usize,
    pub total_unchanged: usize,
}

/// A comparison between two named snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub previous_timestamp: String,
    pub latest_timestamp: String,
    pub changes: ChangeSet,
    pub summary: ChangeSummary,
}
