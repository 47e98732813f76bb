use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub availability: AvailabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8082
}

/// Data directory configuration.
///
/// Every file the system reads or writes lives under `dir`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Availability lookup configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AvailabilityConfig {
    /// Country code used for offers (e.g., "US").
    #[serde(default = "default_country")]
    pub country: String,
    /// Language code used for titles (e.g., "en").
    #[serde(default = "default_language")]
    pub language: String,
    /// Items refreshed within this many days are not re-queried.
    #[serde(default = "default_skip_recent_days")]
    pub skip_recent_days: i64,
    /// Delay after every upstream query (milliseconds).
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Flush the cache file after this many queries.
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: usize,
    /// Number of search results requested per query.
    #[serde(default = "default_results_per_query")]
    pub results_per_query: u32,
    /// Upstream GraphQL endpoint (default: JustWatch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for AvailabilityConfig {
    fn default() -> Self {
        Self {
            country: default_country(),
            language: default_language(),
            skip_recent_days: default_skip_recent_days(),
            delay_ms: default_delay_ms(),
            checkpoint_interval: default_checkpoint_interval(),
            results_per_query: default_results_per_query(),
            base_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_country() -> String {
    "US".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_skip_recent_days() -> i64 {
    7
}

fn default_delay_ms() -> u64 {
    750
}

fn default_checkpoint_interval() -> usize {
    50
}

fn default_results_per_query() -> u32 {
    5
}

fn default_timeout() -> u32 {
    30
}

/// Sanitized config for API responses
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub data_dir: String,
    pub availability: SanitizedAvailabilityConfig,
}

/// Availability settings without the upstream endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAvailabilityConfig {
    pub country: String,
    pub language: String,
    pub skip_recent_days: i64,
    pub delay_ms: u64,
    pub custom_endpoint: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            data_dir: config.data.dir.display().to_string(),
            availability: SanitizedAvailabilityConfig {
                country: config.availability.country.clone(),
                language: config.availability.language.clone(),
                skip_recent_days: config.availability.skip_recent_days,
                delay_ms: config.availability.delay_ms,
                custom_endpoint: config.availability.base_url.is_some(),
            },
        }
    }
}
