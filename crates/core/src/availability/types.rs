//! Types for availability lookups and the availability cache file.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::persist::{read_json_lenient, write_json_atomic};

/// How an offer is paid for.
///
/// Unknown upstream values are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MonetizationType {
    Flatrate,
    Free,
    Ads,
    Rent,
    Buy,
    Other(String),
}

impl MonetizationType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Flatrate => "FLATRATE",
            Self::Free => "FREE",
            Self::Ads => "ADS",
            Self::Rent => "RENT",
            Self::Buy => "BUY",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for MonetizationType {
    fn from(s: String) -> Self {
        match s.to_uppercase().as_str() {
            "FLATRATE" => Self::Flatrate,
            "FREE" => Self::Free,
            "ADS" => Self::Ads,
            "RENT" => Self::Rent,
            "BUY" => Self::Buy,
            _ => Self::Other(s),
        }
    }
}

impl From<MonetizationType> for String {
    fn from(m: MonetizationType) -> Self {
        m.as_str().to_string()
    }
}

impl fmt::Display for MonetizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One way to watch a film on a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityOffer {
    /// Display name (e.g., "Netflix").
    pub name: String,
    /// Provider identifier (e.g., "netflix").
    pub technical_name: String,
    pub monetization_type: MonetizationType,
}

impl AvailabilityOffer {
    pub fn new(
        name: impl Into<String>,
        technical_name: impl Into<String>,
        monetization_type: MonetizationType,
    ) -> Self {
        Self {
            name: name.into(),
            technical_name: technical_name.into(),
            monetization_type,
        }
    }
}

/// A single upstream search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCandidate {
    /// Kind of title (e.g., "MOVIE", "SHOW"), when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    /// Upstream identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
    #[serde(default)]
    pub offers: Vec<AvailabilityOffer>,
}

/// Cached lookup result for one `title|||year` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityCacheEntry {
    /// Raw offers of the matched title, before merge-time reconciliation.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub services: Vec<AvailabilityOffer>,
    #[serde(rename = "justwatch_id", default)]
    pub external_id: Option<String>,
    /// Unparsable timestamps load as `None` and are treated as stale.
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_updated: Option<NaiveDateTime>,
}

/// Run metadata stored next to the cached entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlMetadata {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_full_run: Option<NaiveDateTime>,
    /// Catalog size at the time of the run.
    #[serde(default)]
    pub total_queried: usize,
    /// Items with at least one offer.
    #[serde(default)]
    pub total_matched: usize,
}

/// Contents of the availability cache file.
///
/// Malformed entries are dropped one by one; the rest of the file still loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityCacheFile {
    #[serde(default, deserialize_with = "lenient_metadata")]
    pub metadata: CrawlMetadata,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub movies: BTreeMap<String, AvailabilityCacheEntry>,
}

impl AvailabilityCacheFile {
    /// Load the cache file; missing or malformed files load as empty.
    pub fn load(path: &Path) -> Self {
        read_json_lenient(path).unwrap_or_default()
    }

    /// Atomically replace the cache file.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        write_json_atomic(path, self)
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s.parse::<NaiveDateTime>().ok(),
        _ => None,
    })
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_metadata<'de, D>(deserializer: D) -> Result<CrawlMetadata, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(from_value_or_warn(Value::deserialize(deserializer)?, "metadata").unwrap_or_default())
}

fn lenient_entries<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, AvailabilityCacheEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        Value::Null => return Ok(BTreeMap::new()),
        other => {
            warn!("Ignoring availability cache movies of type {}", json_kind(&other));
            return Ok(BTreeMap::new());
        }
    };

    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| {
            let entry = from_value_or_warn(value, &key)?;
            Some((key, entry))
        })
        .collect())
}

fn from_value_or_warn<T: DeserializeOwned>(value: Value, what: &str) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Dropping malformed availability cache entry {}: {}", what, e);
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
