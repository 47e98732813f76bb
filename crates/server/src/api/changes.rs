//! Snapshot history handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use cinerank_core::{compare_snapshots, ChangeSet, ChangeSummary, Comparison};

use super::error::{diff_error, ApiError};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ChangesParams {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

/// Change buckets with their summary inlined.
#[derive(Debug, Serialize)]
pub struct ChangesBody {
    #[serde(flatten)]
    pub changes: ChangeSet,
    pub summary: ChangeSummary,
}

#[derive(Debug, Serialize)]
pub struct ChangesResponse {
    pub latest_timestamp: String,
    pub previous_timestamp: String,
    pub changes: ChangesBody,
}

impl From<Comparison> for ChangesResponse {
    fn from(comparison: Comparison) -> Self {
        Self {
            latest_timestamp: comparison.latest_timestamp,
            previous_timestamp: comparison.previous_timestamp,
            changes: ChangesBody {
                changes: comparison.changes,
                summary: comparison.summary,
            },
        }
    }
}

/// GET /api/snapshots
///
/// Historical snapshot timestamps, newest first.
pub async fn list_snapshots(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.store().snapshot_timestamps())
}

/// GET /api/changes?from=&to=
pub async fn get_changes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ChangesParams>,
) -> Result<Json<ChangesResponse>, ApiError> {
    let comparison = compare_snapshots(
        state.store(),
        params.from.as_deref(),
        params.to.as_deref(),
    )
    .map_err(diff_error)?;

    Ok(Json(comparison.into()))
}
