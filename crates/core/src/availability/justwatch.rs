//! JustWatch GraphQL search client.
//!
//! Only the popular-titles search is used. No API key is required; the
//! endpoint is rate limited, so callers space their queries out.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::{AvailabilityError, AvailabilityOffer, AvailabilitySource, SearchCandidate};
use crate::config::AvailabilityConfig;

/// Default GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://apis.justwatch.com/graphql";

const SEARCH_QUERY: &str = r#"
query GetSearchTitles(
  $searchTitlesFilter: TitleFilter!,
  $country: Country!,
  $language: Language!,
  $first: Int!,
  $filter: OfferFilter!,
) {
  popularTitles(
    country: $country
    filter: $searchTitlesFilter
    first: $first
    sortBy: POPULAR
    sortRandomSeed: 0
  ) {
    edges {
      node {
        id
        objectType
        content(country: $country, language: $language) {
          title
          originalReleaseYear
        }
        offers(country: $country, platform: WEB, filter: $filter) {
          monetizationType
          package {
            technicalName
            clearName
          }
        }
      }
    }
  }
}
"#;

/// JustWatch search client.
pub struct JustWatchClient {
    client: Client,
    endpoint: String,
    country: String,
    language: String,
    count: u32,
}

impl JustWatchClient {
    /// Create a client from the availability configuration.
    pub fn new(config: &AvailabilityConfig) -> Result<Self, AvailabilityError> {
        if config.country.trim().is_empty() {
            return Err(AvailabilityError::NotConfigured(
                "country code is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            endpoint: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            country: config.country.to_uppercase(),
            language: config.language.clone(),
            count: config.results_per_query,
        })
    }

    /// Override the country used for offers.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into().to_uppercase();
        self
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    fn request_body(&self, title: &str) -> SearchRequest {
        SearchRequest {
            operation_name: "GetSearchTitles",
            query: SEARCH_QUERY,
            variables: json!({
                "searchTitlesFilter": { "searchQuery": title },
                "country": self.country,
                "language": self.language,
                "first": self.count,
                "filter": { "bestOnly": true },
            }),
        }
    }
}

#[async_trait]
impl AvailabilitySource for JustWatchClient {
    async fn search(&self, title: &str) -> Result<Vec<SearchCandidate>, AvailabilityError> {
        debug!("JustWatch search: query='{}', country={}", title, self.country);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.request_body(title))
            .send()
            .await?;

        let status = response.status();
        if status == 429 {
            return Err(AvailabilityError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AvailabilityError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: GraphQlResponse = response.json().await.map_err(|e| {
            AvailabilityError::ParseError(format!("Failed to parse search response: {}", e))
        })?;

        if let Some(error) = body.errors.first() {
            return Err(AvailabilityError::ApiError {
                status: status.as_u16(),
                message: error.message.clone(),
            });
        }

        let data = body
            .data
            .ok_or_else(|| AvailabilityError::ParseError("response has no data".to_string()))?;

        Ok(data
            .popular_titles
            .edges
            .into_iter()
            .map(|edge| edge.node.into())
            .collect())
    }
}

// Wire types

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest {
    operation_name: &'static str,
    query: &'static str,
    variables: serde_json::Value,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<SearchData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchData {
    popular_titles: TitleConnection,
}

#[derive(Deserialize)]
struct TitleConnection {
    #[serde(default)]
    edges: Vec<TitleEdge>,
}

#[derive(Deserialize)]
struct TitleEdge {
    node: TitleNode,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitleNode {
    id: Option<String>,
    object_type: Option<String>,
    content: TitleContent,
    #[serde(default)]
    offers: Vec<OfferNode>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitleContent {
    #[serde(default)]
    title: String,
    original_release_year: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OfferNode {
    monetization_type: String,
    package: PackageNode,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageNode {
    technical_name: String,
    clear_name: String,
}

impl From<TitleNode> for SearchCandidate {
    fn from(node: TitleNode) -> Self {
        Self {
            object_type: node.object_type,
            title: node.content.title,
            release_year: node.content.original_release_year,
            entry_id: node.id,
            offers: node.offers.into_iter().map(|o| o.into()).collect(),
        }
    }
}

impl From<OfferNode> for AvailabilityOffer {
    fn from(offer: OfferNode) -> Self {
        AvailabilityOffer::new(
            offer.package.clear_name,
            offer.package.technical_name,
            offer.monetization_type.into(),
        )
    }
}
