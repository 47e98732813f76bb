//! In-memory merged view of catalog, seen list and availability.
//!
//! Each source file is tracked by a [`FileMarker`]. A changed marker makes
//! its [`Layer`] stale, and staleness propagates to dependent layers before
//! anything is recomputed.

mod cache;

pub use cache::{CachePaths, ReconciliationCache};

use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// One independently updated input of the merged view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Catalog,
    Seen,
    Availability,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Catalog, Layer::Seen, Layer::Availability];

    /// Layers that must be recomputed when this one is.
    pub fn dependents(self) -> &'static [Layer] {
        match self {
            Layer::Catalog => &[Layer::Seen, Layer::Availability],
            Layer::Seen | Layer::Availability => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Catalog => "catalog",
            Layer::Seen => "seen",
            Layer::Availability => "availability",
        }
    }
}

/// Observed state of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMarker {
    Missing,
    Present { modified: SystemTime, len: u64 },
}

impl FileMarker {
    /// Observe `path` now. Unreadable metadata counts as missing.
    pub fn observe(path: &Path) -> Self {
        match fs::metadata(path) {
            Ok(meta) => FileMarker::Present {
                modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                len: meta.len(),
            },
            Err(_) => FileMarker::Missing,
        }
    }
}

/// Expand a set of stale layers with everything that depends on them.
pub fn propagate_staleness(stale: &mut Vec<Layer>) {
    let mut i = 0;
    while i < stale.len() {
        for dependent in stale[i].dependents() {
            if !stale.contains(dependent) {
                stale.push(*dependent);
            }
        }
        i += 1;
    }
}
