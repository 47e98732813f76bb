use std::sync::Arc;

use cinerank_core::{
    CachePaths, Config, ReconciliationCache, SanitizedConfig, SnapshotStore, UserServices,
};

/// Shared application state.
///
/// Everything lives under the configured data directory; the reconciliation
/// cache is the only component holding in-memory state.
pub struct AppState {
    config: Config,
    store: SnapshotStore,
    cache: Arc<ReconciliationCache>,
    services: UserServices,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = SnapshotStore::new(&config.data.dir);
        let cache = Arc::new(ReconciliationCache::new(CachePaths::from_store(&store)));
        Self::with_cache(config, store, cache)
    }

    /// Build state around an existing cache.
    pub fn with_cache(
        config: Config,
        store: SnapshotStore,
        cache: Arc<ReconciliationCache>,
    ) -> Self {
        let services = UserServices::new(store.services_path());
        Self {
            config,
            store,
            cache,
            services,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn cache(&self) -> &Arc<ReconciliationCache> {
        &self.cache
    }

    pub fn services(&self) -> &UserServices {
        &self.services
    }
}
