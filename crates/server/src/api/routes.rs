use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{changes, handlers, middleware::metrics_middleware, movies, services};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Catalog
        .route("/movies", get(movies::list_movies))
        .route("/random", get(movies::random_movie))
        .route("/search", get(movies::search_movies))
        .route("/stats", get(movies::get_stats))
        .route("/filter-options", get(movies::get_filter_options))
        .route("/directors", get(movies::list_directors))
        .route("/countries", get(movies::list_countries))
        // Snapshot history
        .route("/snapshots", get(changes::list_snapshots))
        .route("/changes", get(changes::get_changes))
        // User services
        .route(
            "/my-services",
            get(services::get_my_services).post(services::set_my_services),
        )
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
