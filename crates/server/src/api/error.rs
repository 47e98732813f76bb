//! JSON error bodies shared by the API handlers.

use axum::{http::StatusCode, Json};
use serde::Serialize;

use cinerank_core::{DiffError, QueryError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Rejection returned by every fallible handler.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Listing endpoints without a catalog on disk.
pub fn no_catalog() -> ApiError {
    api_error(
        StatusCode::NOT_FOUND,
        "No movie data found. Please run the scraper first.",
    )
}

impl From<QueryError> for ErrorResponse {
    fn from(e: QueryError) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

pub fn query_error(e: QueryError) -> ApiError {
    let status = match e {
        QueryError::MissingQuery => StatusCode::BAD_REQUEST,
        QueryError::NoMatch => StatusCode::NOT_FOUND,
    };
    (status, Json(e.into()))
}

pub fn diff_error(e: DiffError) -> ApiError {
    match e {
        DiffError::NotEnoughSnapshots => api_error(StatusCode::NOT_FOUND, e.to_string()),
        DiffError::UnknownSnapshot(_) => {
            api_error(StatusCode::BAD_REQUEST, "Invalid snapshot timestamp")
        }
    }
}
