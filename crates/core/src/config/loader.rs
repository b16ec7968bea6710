//! Configuration loading.
//!
//! The TOML file is read first, then environment variables prefixed with
//! `TRACKERHUB_` are merged over it. A double underscore separates nesting
//! levels, since field names such as `request_delay_secs` already contain
//! single underscores. Values use figment's inline syntax, so the whole
//! indexer list can be supplied from the environment:
//!
//! ```text
//! TRACKERHUB_INDEXERS='[{id="xz", username="alice", password="secret"}]'
//! ```
//!
//! `TRACKERHUB_CONFIG` names the file itself; it reaches this loader as an
//! unknown `config` key and is ignored.

use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};

use super::{types::Config, ConfigError};

/// Prefix of environment variables that override file settings.
const ENV_PREFIX: &str = "TRACKERHUB_";
/// Separator between nesting levels in override variable names.
const ENV_SEPARATOR: &str = "__";

/// Read `path` and apply `TRACKERHUB_` overrides.
///
/// A missing file is an error rather than an empty configuration.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Parse a TOML document without file or environment lookups.
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
