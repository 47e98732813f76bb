//! File-backed snapshot storage.
//!
//! Layout under the data directory:
//! - `latest.json` / `latest.csv`: the current catalog
//! - `mubi_top_1000_<YYYYMMDD_HHMMSS>.json` / `.csv`: historical snapshots
//! - `thrown_out_*.json`: exclusion lists (`{"movies": [titles]}`)
//! - `comparison_report_<timestamp>.json`: saved diff reports

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{CatalogItem, StoreError};
use crate::diff::{ChangeSet, ChangeSummary};
use crate::persist::{read_json_lenient, write_atomic, write_json_atomic};

const SNAPSHOT_PREFIX: &str = "mubi_top_1000_";
const EXCLUSION_PREFIX: &str = "thrown_out_";
const REPORT_PREFIX: &str = "comparison_report_";

pub const LATEST_FILE: &str = "latest.json";
pub const LATEST_CSV_FILE: &str = "latest.csv";
pub const SEEN_FILE: &str = "watched.csv";
pub const AVAILABILITY_FILE: &str = "streaming.json";
pub const SERVICES_FILE: &str = "my_services.json";

/// Producer fields of an item, as persisted in snapshot files.
#[derive(Debug, Serialize)]
struct SnapshotRecord<'a> {
    rank: u32,
    title: &'a str,
    director: &'a str,
    country: &'a str,
    year: &'a str,
    url: &'a str,
    watchable: bool,
    scraped_at: Option<NaiveDateTime>,
}

impl<'a> From<&'a CatalogItem> for SnapshotRecord<'a> {
    fn from(item: &'a CatalogItem) -> Self {
        Self {
            rank: item.rank,
            title: &item.title,
            director: &item.director,
            country: &item.country,
            year: &item.year,
            url: &item.url,
            watchable: item.watchable,
            scraped_at: item.scraped_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExclusionFile {
    #[serde(default)]
    movies: Vec<String>,
}

/// Result of persisting a new snapshot.
#[derive(Debug, Clone)]
pub struct SavedSnapshot {
    pub timestamp: String,
    pub json_path: PathBuf,
    pub csv_path: PathBuf,
}

/// A saved comparison report.
#[derive(Debug, Serialize)]
pub struct ComparisonReport<'a> {
    pub timestamp: String,
    pub summary: ChangeSummary,
    pub changes: &'a ChangeSet,
}

/// File-backed store for catalog snapshots and their side files.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    data_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn latest_path(&self) -> PathBuf {
        self.data_dir.join(LATEST_FILE)
    }

    pub fn seen_path(&self) -> PathBuf {
        self.data_dir.join(SEEN_FILE)
    }

    pub fn availability_path(&self) -> PathBuf {
        self.data_dir.join(AVAILABILITY_FILE)
    }

    pub fn services_path(&self) -> PathBuf {
        self.data_dir.join(SERVICES_FILE)
    }

    /// Load the current catalog. `None` when no catalog has been saved yet.
    pub fn load_latest(&self) -> Option<Vec<CatalogItem>> {
        read_json_lenient(&self.latest_path())
    }

    /// Load every historical snapshot keyed by its filename timestamp.
    ///
    /// Unreadable snapshots are logged and skipped.
    pub fn load_historical(&self) -> BTreeMap<String, Vec<CatalogItem>> {
        self.snapshot_files()
            .into_iter()
            .filter_map(|(timestamp, path)| {
                read_json_lenient(&path).map(|items| (timestamp, items))
            })
            .collect()
    }

    /// Timestamps of all historical snapshots, newest first.
    pub fn snapshot_timestamps(&self) -> Vec<String> {
        let mut timestamps: Vec<String> = self.load_historical().into_keys().collect();
        timestamps.sort_unstable_by(|a, b| b.cmp(a));
        timestamps
    }

    /// Load one historical snapshot by timestamp.
    pub fn load_snapshot(&self, timestamp: &str) -> Option<Vec<CatalogItem>> {
        let path = self
            .data_dir
            .join(format!("{}{}.json", SNAPSHOT_PREFIX, timestamp));
        read_json_lenient(&path)
    }

    /// Union of every exclusion file's titles.
    pub fn load_exclusions(&self) -> HashSet<String> {
        let mut titles = HashSet::new();
        for path in self.files_with(EXCLUSION_PREFIX, ".json") {
            if let Some(file) = read_json_lenient::<ExclusionFile>(&path) {
                titles.extend(file.movies);
            }
        }
        titles
    }

    /// Persist a freshly produced catalog as a new snapshot and as latest.
    ///
    /// Returns `Ok(None)` without writing anything when the listing is
    /// identical to the current latest (ignoring scrape times).
    pub fn save_snapshot(
        &self,
        items: &[CatalogItem],
        name: Option<&str>,
    ) -> Result<Option<SavedSnapshot>, StoreError> {
        if items.is_empty() {
            warn!("No items to save");
            return Ok(None);
        }

        if let Some(existing) = self.load_latest() {
            let unchanged = existing.len() == items.len()
                && existing.iter().zip(items).all(|(a, b)| a.same_listing(b));
            if unchanged {
                info!("No changes detected from latest data, skipping save");
                return Ok(None);
            }
        }

        fs::create_dir_all(&self.data_dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let stem = match name {
            Some(name) => name.to_string(),
            None => format!("{}{}", SNAPSHOT_PREFIX, timestamp),
        };

        let records: Vec<SnapshotRecord<'_>> = items.iter().map(SnapshotRecord::from).collect();

        let json_path = self.data_dir.join(format!("{}.json", stem));
        let csv_path = self.data_dir.join(format!("{}.csv", stem));
        write_json_atomic(&json_path, &records)?;
        write_atomic(&csv_path, &records_to_csv(&records)?)?;

        write_json_atomic(&self.latest_path(), &records)?;
        write_atomic(&self.data_dir.join(LATEST_CSV_FILE), &records_to_csv(&records)?)?;

        info!("Snapshot saved to {:?} and {:?}", json_path, csv_path);

        Ok(Some(SavedSnapshot {
            timestamp,
            json_path,
            csv_path,
        }))
    }

    /// Save a diff report; the timestamp defaults to now.
    pub fn save_comparison_report(
        &self,
        changes: &ChangeSet,
        timestamp: Option<String>,
    ) -> Result<PathBuf, StoreError> {
        let timestamp =
            timestamp.unwrap_or_else(|| Local::now().format("%Y%m%d_%H%M%S").to_string());
        let report = ComparisonReport {
            summary: changes.summary(),
            timestamp: timestamp.clone(),
            changes,
        };
        let path = self
            .data_dir
            .join(format!("{}{}.json", REPORT_PREFIX, timestamp));
        write_json_atomic(&path, &report)?;
        info!("Comparison report saved to {:?}", path);
        Ok(path)
    }

    /// Historical snapshot files as (timestamp, path).
    fn snapshot_files(&self) -> Vec<(String, PathBuf)> {
        self.files_with(SNAPSHOT_PREFIX, ".json")
            .into_iter()
            .filter_map(|path| {
                let name = path.file_name()?.to_str()?;
                let timestamp = name
                    .strip_prefix(SNAPSHOT_PREFIX)?
                    .strip_suffix(".json")?
                    .to_string();
                Some((timestamp, path))
            })
            .collect()
    }

    fn files_with(&self, prefix: &str, suffix: &str) -> Vec<PathBuf> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(prefix) && n.ends_with(suffix))
            })
            .collect();
        paths.sort();
        paths
    }
}

fn records_to_csv(records: &[SnapshotRecord<'_>]) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| StoreError::Serialization(e.to_string()))
}
