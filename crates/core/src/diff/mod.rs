//! Rank movement between two catalog snapshots.
//!
//! Entries are matched by their exact title. Excluded titles are removed from
//! both sides before matching, so they never appear in any bucket.

mod types;

pub use types::*;

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::catalog::{CatalogItem, SnapshotStore};

/// Titles in first-occurrence order, each mapped to its last occurrence.
struct TitleIndex<'a> {
    order: Vec<&'a str>,
    items: HashMap<&'a str, &'a CatalogItem>,
}

impl<'a> TitleIndex<'a> {
    fn build(items: &'a [CatalogItem], exclusions: &HashSet<String>) -> Self {
        let mut order = Vec::new();
        let mut by_title = HashMap::new();
        for item in items {
            if exclusions.contains(&item.title) {
                continue;
            }
            if by_title.insert(item.title.as_str(), item).is_none() {
                order.push(item.title.as_str());
            }
        }
        Self {
            order,
            items: by_title,
        }
    }

    fn ordered(&self) -> impl Iterator<Item = (&'a str, &'a CatalogItem)> + '_ {
        self.order.iter().map(move |title| (*title, self.items[title]))
    }
}

/// Classify every title of `old` and `new`.
///
/// An empty `new` reports every old title as removed; an empty `old` reports
/// every new title as added.
pub fn diff(old: &[CatalogItem], new: &[CatalogItem], exclusions: &HashSet<String>) -> ChangeSet {
    let old_index = TitleIndex::build(old, exclusions);
    let new_index = TitleIndex::build(new, exclusions);
    let mut changes = ChangeSet::default();

    for (title, new_item) in new_index.ordered() {
        let Some(old_item) = old_index.items.get(title) else {
            changes.added.push(new_item.clone());
            continue;
        };

        let (old_rank, new_rank) = (old_item.rank, new_item.rank);
        if old_rank == new_rank {
            changes.unchanged.push(new_item.clone());
            continue;
        }

        let moved = MovedEntry {
            title: title.to_string(),
            director: new_item.director.clone(),
            year: new_item.year.clone(),
            old_rank,
            new_rank,
            change: old_rank.abs_diff(new_rank),
        };
        if new_rank < old_rank {
            changes.moved_up.push(moved);
        } else {
            changes.moved_down.push(moved);
        }
    }

    for (title, old_item) in old_index.ordered() {
        if !new_index.items.contains_key(title) {
            changes.removed.push(old_item.clone());
        }
    }

    debug!("Diff summary: {:?}", changes.summary());
    changes
}

/// Compare two historical snapshots from the store.
///
/// `to` defaults to the newest snapshot and `from` to the one before it.
/// An empty snapshot on either side yields an empty change set.
pub fn compare_snapshots(
    store: &SnapshotStore,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<Comparison, DiffError> {
    let historical = store.load_historical();
    if historical.len() < 2 {
        return Err(DiffError::NotEnoughSnapshots);
    }

    let mut timestamps: Vec<&String> = historical.keys().collect();
    timestamps.sort_unstable_by(|a, b| b.cmp(a));

    let latest = to.unwrap_or(timestamps[0].as_str());
    let previous = from.unwrap_or(timestamps[1].as_str());

    let new = historical
        .get(latest)
        .ok_or_else(|| DiffError::UnknownSnapshot(latest.to_string()))?;
    let old = historical
        .get(previous)
        .ok_or_else(|| DiffError::UnknownSnapshot(previous.to_string()))?;

    let changes = if old.is_empty() || new.is_empty() {
        debug!("Empty snapshot in comparison {} -> {}", previous, latest);
        ChangeSet::default()
    } else {
        diff(old, new, &store.load_exclusions())
    };
    Ok(Comparison {
        previous_timestamp: previous.to_string(),
        latest_timestamp: latest.to_string(),
        summary: changes.summary(),
        changes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use tempfile::TempDir;

    fn item(rank: u32, title: &str) -> CatalogItem {
        fixtures::catalog_item(rank, title, "2000")
    }

    fn no_exclusions() -> HashSet<String> {
        HashSet::new()
    }

    #[test]
    fn test_moved_up_and_removed() {
        let old = vec![item(1, "A"), item(4, "Y"), item(5, "X")];
        let new = vec![item(1, "A"), item(2, "X"), item(3, "Z")];

        let changes = diff(&old, &new, &no_exclusions());
        assert_eq!(changes.moved_up.len(), 1);
        assert_eq!(changes.moved_up[0].title, "X");
        assert_eq!(changes.moved_up[0].change, 3);
        assert_eq!(changes.moved_up[0].old_rank, 5);
        assert_eq!(changes.moved_up[0].new_rank, 2);

        assert_eq!(changes.removed.len(), 1);
        assert_eq!(changes.removed[0].title, "Y");
        assert_eq!(changes.added[0].title, "Z");
        assert_eq!(changes.unchanged[0].title, "A");
    }

    #[test]
    fn test_moved_down_change_positive() {
        let old = vec![item(2, "X")];
        let new = vec![item(9, "X")];
        let changes = diff(&old, &new, &no_exclusions());
        assert_eq!(changes.moved_down[0].change, 7);
        assert!(changes.moved_up.is_empty());
    }

    #[test]
    fn test_partition_complete() {
        let old = vec![item(1, "A"), item(2, "B"), item(3, "C"), item(4, "D")];
        let new = vec![item(1, "B"), item(2, "A"), item(3, "C"), item(4, "E")];

        let summary = diff(&old, &new, &no_exclusions()).summary();
        let total = summary.total_added
            + summary.total_removed
            + summary.total_moved_up
            + summary.total_moved_down
            + summary.total_unchanged;
        // Union of titles: A B C D E
        assert_eq!(total, 5);
        assert_eq!(summary.total_unchanged, 1);
        assert_eq!(summary.total_moved_up, 1);
        assert_eq!(summary.total_moved_down, 1);
    }

    #[test]
    fn test_excluded_title_produces_nothing() {
        let old = vec![item(1, "A"), item(3, "Gone")];
        let new = vec![item(1, "A"), item(7, "Gone")];
        let exclusions: HashSet<String> = ["Gone".to_string()].into_iter().collect();

        let changes = diff(&old, &new, &exclusions);
        assert_eq!(changes.unchanged.len(), 1);
        assert!(changes.moved_down.is_empty());
        assert!(changes.removed.is_empty());
        assert!(changes.added.is_empty());

        // Excluded on one side only: still nothing.
        let new = vec![item(1, "A")];
        let changes = diff(&old, &new, &exclusions);
        assert!(changes.removed.is_empty());
    }

    #[test]
    fn test_emptied_list_reports_removal() {
        let old = vec![item(1, "Y")];

        let changes = diff(&old, &[], &no_exclusions());
        assert_eq!(changes.removed.len(), 1);
        assert_eq!(changes.removed[0].title, "Y");
        assert_eq!(changes.summary().total_removed, 1);
        assert!(changes.added.is_empty());

        let changes = diff(&[], &old, &no_exclusions());
        assert_eq!(changes.added.len(), 1);
        assert!(changes.removed.is_empty());
    }

    #[test]
    fn test_compare_snapshots_empty_snapshot_yields_empty_changeset() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        std::fs::write(
            dir.path().join("mubi_top_1000_20250101_000000.json"),
            serde_json::to_string(&[item(1, "Y")]).unwrap(),
        )
        .unwrap();
        std::fs::write(dir.path().join("mubi_top_1000_20250102_000000.json"), "[]").unwrap();

        let comparison = compare_snapshots(&store, None, None).unwrap();
        assert_eq!(comparison.latest_timestamp, "20250102_000000");
        assert!(comparison.changes.is_empty());
        assert_eq!(comparison.summary.total_removed, 0);
    }

    #[test]
    fn test_later_duplicate_wins_first_position_kept() {
        let old = vec![item(1, "A"), item(2, "B")];
        let new = vec![item(1, "B"), item(2, "A"), item(5, "B")];

        let changes = diff(&old, &new, &no_exclusions());
        // B: last occurrence (rank 5) compared against old rank 2.
        assert_eq!(changes.moved_down.len(), 2);
        assert_eq!(changes.moved_down[0].title, "B");
        assert_eq!(changes.moved_down[0].new_rank, 5);
        assert_eq!(changes.moved_down[1].title, "A");
    }

    #[test]
    fn test_output_order_follows_snapshots() {
        let old = vec![item(1, "R1"), item(2, "Keep"), item(3, "R2")];
        let new = vec![item(1, "N2"), item(2, "Keep"), item(3, "N1")];

        let changes = diff(&old, &new, &no_exclusions());
        let added: Vec<&str> = changes.added.iter().map(|i| i.title.as_str()).collect();
        let removed: Vec<&str> = changes.removed.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(added, vec!["N2", "N1"]);
        assert_eq!(removed, vec!["R1", "R2"]);
    }

    #[test]
    fn test_compare_snapshots_defaults_and_errors() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        let write = |ts: &str, items: &[CatalogItem]| {
            std::fs::write(
                dir.path().join(format!("mubi_top_1000_{}.json", ts)),
                serde_json::to_string(items).unwrap(),
            )
            .unwrap();
        };

        write("20250101_000000", &[item(1, "A"), item(2, "B")]);
        assert_eq!(
            compare_snapshots(&store, None, None).unwrap_err(),
            DiffError::NotEnoughSnapshots
        );

        write("20250201_000000", &[item(1, "B"), item(2, "A")]);
        write("20240101_000000", &[item(1, "A")]);

        let comparison = compare_snapshots(&store, None, None).unwrap();
        assert_eq!(comparison.latest_timestamp, "20250201_000000");
        assert_eq!(comparison.previous_timestamp, "20250101_000000");
        assert_eq!(comparison.summary.total_moved_up, 1);
        assert_eq!(comparison.summary.total_moved_down, 1);

        let older = compare_snapshots(&store, Some("20240101_000000"), None).unwrap();
        assert_eq!(older.summary.total_added, 1);

        assert_eq!(
            compare_snapshots(&store, Some("19990101_000000"), None).unwrap_err(),
            DiffError::UnknownSnapshot("19990101_000000".to_string())
        );
    }

    #[test]
    fn test_compare_snapshots_applies_exclusions() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path());
        std::fs::write(
            dir.path().join("mubi_top_1000_20250101_000000.json"),
            serde_json::to_string(&[item(1, "A"), item(2, "Gone")]).unwrap(),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("mubi_top_1000_20250102_000000.json"),
            serde_json::to_string(&[item(1, "A")]).unwrap(),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("thrown_out_20250102.json"),
            r#"{"movies": ["Gone"]}"#,
        )
        .unwrap();

        let comparison = compare_snapshots(&store, None, None).unwrap();
        assert_eq!(comparison.summary.total_removed, 0);
        assert_eq!(comparison.summary.total_unchanged, 1);
    }
}
