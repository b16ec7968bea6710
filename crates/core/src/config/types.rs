use serde::{Deserialize, Serialize};

use crate::category::CategoryMapping;
use crate::indexers::xtreme_zone::{DEFAULT_LINK, DEFAULT_REQUEST_DELAY_SECS};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub indexers: Vec<IndexerConfig>,
}

/// Supported site families
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IndexerKind {
    #[default]
    XtremeZone,
}

impl IndexerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexerKind::XtremeZone => "xtreme_zone",
        }
    }
}

/// One configured indexer instance
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexerConfig {
    /// Unique identifier, used in logs, metrics and the registry
    pub id: String,
    /// Site family (default: "xtreme_zone")
    #[serde(default)]
    pub kind: IndexerKind,
    /// Display name (default: the site family's name)
    #[serde(default)]
    pub name: Option<String>,
    /// Site root URL
    #[serde(default = "default_url")]
    pub url: String,
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Minimum delay between requests in seconds (default: 2.1)
    #[serde(default = "default_request_delay")]
    pub request_delay_secs: f64,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Replaces the built-in category table when not empty
    #[serde(default)]
    pub categories: Vec<CategoryMapping>,
}

fn default_url() -> String {
    DEFAULT_LINK.to_string()
}

fn default_request_delay() -> f64 {
    DEFAULT_REQUEST_DELAY_SECS
}

fn default_timeout() -> u32 {
    30
}

fn default_enabled() -> bool {
    true
}

/// Sanitized config for display (passwords redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub indexers: Vec<SanitizedIndexerConfig>,
}

/// Sanitized indexer config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedIndexerConfig {
    pub id: String,
    pub kind: String,
    /// Display name override; the indexer's built-in name applies when unset.
    pub name: Option<String>,
    pub url: String,
    pub username: String,
    pub password_configured: bool,
    pub request_delay_secs: f64,
    pub timeout_secs: u32,
    pub enabled: bool,
    pub custom_categories: usize,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            indexers: config
                .indexers
                .iter()
                .map(|i| SanitizedIndexerConfig {
                    id: i.id.clone(),
                    kind: i.kind.as_str().to_string(),
                    name: i.name.clone(),
                    url: i.url.clone(),
                    username: i.username.clone(),
                    password_configured: !i.password.is_empty(),
                    request_delay_secs: i.request_delay_secs,
                    timeout_secs: i.timeout_secs,
                    enabled: i.enabled,
                    custom_categories: i.categories.len(),
                })
                .collect(),
        }
    }
}
