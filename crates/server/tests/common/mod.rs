//! Common test utilities for API testing.
//!
//! This module provides a test fixture that builds the router over a
//! temporary data directory, so every test controls exactly which catalog,
//! seen list and availability files exist.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use cinerank_core::{
    AvailabilityCacheEntry, AvailabilityCacheFile, AvailabilityOffer, CatalogItem, Config,
};
use cinerank_server::state::AppState;

/// Re-export fixtures for test convenience
pub use cinerank_core::testing::fixtures;

/// Test fixture for API testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_list() {
///     let fixture = TestFixture::new();
///     fixture.write_catalog(&fixtures::ranked_list(&[("Stalker", "1979")]));
///
///     let response = fixture.get("/api/movies").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Data directory backing the store and cache
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub text: String,
}

impl TestFixture {
    /// Create a fixture over an empty data directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let mut config = Config::default();
        config.server.host = std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST);
        config.data.dir = temp_dir.path().to_path_buf();

        let state = Arc::new(AppState::new(config));
        let router = cinerank_server::api::create_router(state);

        Self { router, temp_dir }
    }

    pub fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write the current catalog (`latest.json`).
    pub fn write_catalog(&self, items: &[CatalogItem]) {
        self.write_json("latest.json", items);
    }

    /// Write the seen list (`watched.csv`).
    pub fn write_seen(&self, csv: &str) {
        std::fs::write(self.data_dir().join("watched.csv"), csv).expect("Failed to write seen list");
    }

    /// Write the availability cache with one entry per (title, year, offers).
    pub fn write_availability(&self, entries: &[(&str, &str, Vec<AvailabilityOffer>)]) {
        let mut file = AvailabilityCacheFile::default();
        for (title, year, offers) in entries {
            file.movies.insert(
                format!("{}|||{}", title, year),
                AvailabilityCacheEntry {
                    services: offers.clone(),
                    external_id: None,
                    last_updated: None,
                },
            );
        }
        self.write_json("streaming.json", &file);
    }

    /// Write a historical snapshot.
    pub fn write_snapshot(&self, timestamp: &str, items: &[CatalogItem]) {
        self.write_json(&format!("mubi_top_1000_{}.json", timestamp), items);
    }

    fn write_json<T: serde::Serialize + ?Sized>(&self, name: &str, value: &T) {
        std::fs::write(
            self.data_dir().join(name),
            serde_json::to_string_pretty(value).unwrap(),
        )
        .expect("Failed to write fixture file");
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body, text }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
