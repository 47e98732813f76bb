//! The user's streaming subscriptions.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::error::{api_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetServicesRequest {
    #[serde(default)]
    pub services: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SetServicesResponse {
    pub success: bool,
    pub services: Vec<String>,
}

/// GET /api/my-services
pub async fn get_my_services(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.services().list())
}

/// POST /api/my-services
///
/// Replaces the whole list.
pub async fn set_my_services(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SetServicesRequest>,
) -> Result<Json<SetServicesResponse>, ApiError> {
    if let Err(e) = state.services().save(&request.services) {
        error!("Failed to save services to {:?}: {}", state.services().path(), e);
        return Err(api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to save services: {}", e),
        ));
    }

    info!("Saved {} streaming services", request.services.len());
    Ok(Json(SetServicesResponse {
        success: true,
        services: request.services,
    }))
}
