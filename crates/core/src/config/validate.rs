use std::collections::HashSet;

use url::Url;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Indexer ids are non-empty and unique
/// - Indexer URLs are absolute http(s) URLs
/// - Usernames are non-empty
/// - Request delays are finite and not negative
/// - Timeouts are not 0
/// - Category codes are non-empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for indexer in &config.indexers {
        let id = indexer.id.trim();
        if id.is_empty() {
            return Err(ConfigError::ValidationError(
                "indexers.id cannot be empty".to_string(),
            ));
        }
        if !seen.insert(id) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate indexer id '{}'",
                id
            )));
        }

        match Url::parse(&indexer.url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => {
                return Err(ConfigError::ValidationError(format!(
                    "indexer '{}': unsupported url scheme '{}'",
                    id,
                    url.scheme()
                )))
            }
            Err(e) => {
                return Err(ConfigError::ValidationError(format!(
                    "indexer '{}': invalid url '{}': {}",
                    id, indexer.url, e
                )))
            }
        }

        if indexer.username.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "indexer '{}': username cannot be empty",
                id
            )));
        }

        if !indexer.request_delay_secs.is_finite() || indexer.request_delay_secs < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "indexer '{}': request_delay_secs must be a non-negative number",
                id
            )));
        }

        if indexer.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(format!(
                "indexer '{}': timeout_secs cannot be 0",
                id
            )));
        }

        if indexer.categories.iter().any(|c| c.code.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "indexer '{}': category codes cannot be empty",
                id
            )));
        }
    }

    Ok(())
}
