//! Reconciliation cache implementation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use super::{propagate_staleness, FileMarker, Layer};
use crate::availability::{policy, AvailabilityCacheFile};
use crate::catalog::{CatalogItem, SnapshotStore};
use crate::metrics;
use crate::persist::read_json_lenient;
use crate::seen::SeenList;

/// Locations of the three source files.
#[derive(Debug, Clone)]
pub struct CachePaths {
    pub catalog: PathBuf,
    pub seen: PathBuf,
    pub availability: PathBuf,
}

impl CachePaths {
    pub fn from_store(store: &SnapshotStore) -> Self {
        Self {
            catalog: store.latest_path(),
            seen: store.seen_path(),
            availability: store.availability_path(),
        }
    }

    fn path(&self, layer: Layer) -> &Path {
        match layer {
            Layer::Catalog => &self.catalog,
            Layer::Seen => &self.seen,
            Layer::Availability => &self.availability,
        }
    }
}

#[derive(Default)]
struct CacheState {
    /// Last observed marker per layer; absent until first refresh.
    markers: HashMap<Layer, FileMarker>,
    /// `None` when the catalog file is missing or malformed.
    items: Option<Vec<Arc<CatalogItem>>>,
}

/// Merged, lazily refreshed view of the catalog with its overlays.
///
/// The cache only reads source files. Refresh and read happen under one
/// lock, so a caller never sees a partially rebuilt list.
pub struct ReconciliationCache {
    paths: CachePaths,
    state: Mutex<CacheState>,
}

impl ReconciliationCache {
    pub fn new(paths: CachePaths) -> Self {
        Self {
            paths,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn paths(&self) -> &CachePaths {
        &self.paths
    }

    /// Current merged items, refreshing stale layers first.
    ///
    /// Returns `None` when there is no usable catalog file, and `Some(vec![])`
    /// for an empty one.
    pub fn get_items(&self) -> Option<Vec<Arc<CatalogItem>>> {
        let mut state = self.lock();
        self.refresh(&mut state);
        state.items.clone()
    }

    /// Forget all markers; the next read reloads every layer.
    pub fn invalidate(&self) {
        self.lock().markers.clear();
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn refresh(&self, state: &mut CacheState) {
        let mut stale = Vec::new();
        let mut observed = Vec::with_capacity(Layer::ALL.len());

        for layer in Layer::ALL {
            let marker = FileMarker::observe(self.paths.path(layer));
            if state.markers.get(&layer) != Some(&marker) {
                stale.push(layer);
            }
            observed.push((layer, marker));
        }

        if stale.is_empty() {
            return;
        }
        propagate_staleness(&mut stale);

        if stale.contains(&Layer::Catalog) {
            state.items = self.load_catalog();
            metrics::CACHE_RELOADS
                .with_label_values(&[Layer::Catalog.as_str()])
                .inc();
        }

        if let Some(items) = state.items.as_mut() {
            if stale.contains(&Layer::Seen) {
                let seen = SeenList::load(&self.paths.seen);
                debug!("Applying seen list with {} entries", seen.len());
                *items = apply_seen(items, &seen);
                metrics::CACHE_RELOADS
                    .with_label_values(&[Layer::Seen.as_str()])
                    .inc();
            }

            if stale.contains(&Layer::Availability) {
                let availability = AvailabilityCacheFile::load(&self.paths.availability);
                debug!(
                    "Applying availability for {} keys",
                    availability.movies.len()
                );
                *items = apply_availability(items, &availability);
                metrics::CACHE_RELOADS
                    .with_label_values(&[Layer::Availability.as_str()])
                    .inc();
            }
        }

        for (layer, marker) in observed {
            state.markers.insert(layer, marker);
        }
    }

    fn load_catalog(&self) -> Option<Vec<Arc<CatalogItem>>> {
        let path = &self.paths.catalog;
        if !path.exists() {
            debug!("No catalog at {:?}", path);
            return None;
        }

        let Some(items) = read_json_lenient::<Vec<CatalogItem>>(path) else {
            warn!("Catalog at {:?} is unusable", path);
            return None;
        };

        info!("Loaded {} catalog items from {:?}", items.len(), path);
        Some(
            items
                .into_iter()
                .map(|mut item| {
                    item.watched = false;
                    item.streaming_services.clear();
                    item.streaming_services_full.clear();
                    Arc::new(item)
                })
                .collect(),
        )
    }
}

fn apply_seen(items: &[Arc<CatalogItem>], seen: &SeenList) -> Vec<Arc<CatalogItem>> {
    items
        .iter()
        .map(|item| {
            let mut next = CatalogItem::clone(item);
            next.watched = seen.contains(item);
            Arc::new(next)
        })
        .collect()
}

fn apply_availability(
    items: &[Arc<CatalogItem>],
    availability: &AvailabilityCacheFile,
) -> Vec<Arc<CatalogItem>> {
    items
        .iter()
        .map(|item| {
            let mut next = CatalogItem::clone(item);
            let offers = availability
                .movies
                .get(&item.availability_key())
                .map(|entry| policy::reconcile_offers(&entry.services))
                .unwrap_or_default();
            next.streaming_services = policy::service_identifiers(&offers);
            next.streaming_services_full = offers;
            Arc::new(next)
        })
        .collect()
}
