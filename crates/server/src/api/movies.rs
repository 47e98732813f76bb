//! Catalog listing, search and statistics handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use cinerank_core::catalog::CatalogItem;
use cinerank_core::query::{
    apply_filters, compute_stats, country_counts, director_counts, filter_options, pick_random,
    prefilter_text, text_search, CatalogStats, FilterOptions, NameCount,
};
use cinerank_core::{CatalogFilter, QueryError};

use super::error::{api_error, no_catalog, query_error, ApiError};
use crate::state::AppState;

/// Filters plus the optional free-text query.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(flatten)]
    pub filter: CatalogFilter,
}

/// Current merged catalog. Refreshing reads files, so it runs off the runtime.
async fn catalog(state: &AppState) -> Result<Vec<Arc<CatalogItem>>, ApiError> {
    let cache = Arc::clone(state.cache());
    tokio::task::spawn_blocking(move || cache.get_items())
        .await
        .map_err(|e| {
            tracing::error!("Catalog refresh task failed: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load catalog")
        })?
        .ok_or_else(no_catalog)
}

fn filtered(
    state: &AppState,
    items: Vec<Arc<CatalogItem>>,
    filter: &CatalogFilter,
) -> Vec<Arc<CatalogItem>> {
    apply_filters(items, filter, &state.services().set())
}

/// GET /api/movies
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Arc<CatalogItem>>>, ApiError> {
    let items = catalog(&state).await?;
    Ok(Json(filtered(&state, items, &params.filter)))
}

/// GET /api/random
///
/// One random item after the optional `q` pre-filter and the usual filters.
pub async fn random_movie(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Arc<CatalogItem>>, ApiError> {
    let items = catalog(&state).await?;
    let items = prefilter_text(items, params.q.as_deref());
    let items = filtered(&state, items, &params.filter);

    let pick = pick_random(&items, &mut rand::thread_rng()).map_err(query_error)?;
    Ok(Json(pick))
}

/// GET /api/search
pub async fn search_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Arc<CatalogItem>>>, ApiError> {
    let query = params.q.as_deref().unwrap_or_default();
    if query.is_empty() {
        return Err(query_error(QueryError::MissingQuery));
    }

    let items = catalog(&state).await?;
    let items = text_search(items, query).map_err(query_error)?;
    Ok(Json(filtered(&state, items, &params.filter)))
}

/// GET /api/stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<CatalogStats>, ApiError> {
    let items = catalog(&state).await?;
    Ok(Json(compute_stats(&items)))
}

/// GET /api/filter-options
pub async fn get_filter_options(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FilterOptions>, ApiError> {
    let items = catalog(&state).await?;
    Ok(Json(filter_options(&items)))
}

/// GET /api/directors
pub async fn list_directors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<NameCount>>, ApiError> {
    let items = catalog(&state).await?;
    Ok(Json(director_counts(&items)))
}

/// GET /api/countries
pub async fn list_countries(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<NameCount>>, ApiError> {
    let items = catalog(&state).await?;
    Ok(Json(country_counts(&items)))
}
