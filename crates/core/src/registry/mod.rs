//! Indexers keyed by id, built from configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::category::CategoryTable;
use crate::config::{Config, IndexerConfig, IndexerKind};
use crate::credentials::{Credentials, StaticCredentialStore};
use crate::diagnostics::ParseErrorSink;
use crate::indexers::{IndexerAdapter, XtremeZoneIndexer, XtremeZoneSettings};
use crate::transport::{ReqwestTransport, Transport, TransportConfig, TransportError};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Indexer '{0}' is already registered")]
    DuplicateIndexer(String),

    #[error("Invalid indexer configuration: {0}")]
    Config(String),

    #[error("Failed to create transport: {0}")]
    Transport(#[from] TransportError),
}

/// Registered indexers, iterated in id order.
#[derive(Default)]
pub struct IndexerRegistry {
    indexers: BTreeMap<String, Arc<dyn IndexerAdapter>>,
}

impl IndexerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every enabled indexer of `config`.
    pub fn from_config(
        config: &Config,
        sink: Arc<dyn ParseErrorSink>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for indexer_config in &config.indexers {
            if !indexer_config.enabled {
                debug!(indexer = %indexer_config.id, "Skipping disabled indexer");
                continue;
            }
            registry.register(create_indexer(indexer_config, Arc::clone(&sink))?)?;
        }
        info!(count = registry.len(), "Indexers registered");
        Ok(registry)
    }

    pub fn register(&mut self, indexer: Arc<dyn IndexerAdapter>) -> Result<(), RegistryError> {
        let id = indexer.id().to_string();
        if self.indexers.contains_key(&id) {
            return Err(RegistryError::DuplicateIndexer(id));
        }
        self.indexers.insert(id, indexer);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn IndexerAdapter>> {
        self.indexers.get(id).cloned()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.indexers.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn IndexerAdapter>> {
        self.indexers.values()
    }

    pub fn len(&self) -> usize {
        self.indexers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexers.is_empty()
    }
}

/// Factory function to create an indexer with its own HTTP transport
pub fn create_indexer(
    config: &IndexerConfig,
    sink: Arc<dyn ParseErrorSink>,
) -> Result<Arc<dyn IndexerAdapter>, RegistryError> {
    let transport = ReqwestTransport::new(TransportConfig {
        request_delay_secs: config.request_delay_secs,
        timeout_secs: config.timeout_secs,
    })?;
    create_indexer_with_transport(config, Arc::new(transport), sink)
}

/// Factory function to create an indexer on top of an existing transport
pub fn create_indexer_with_transport(
    config: &IndexerConfig,
    transport: Arc<dyn Transport>,
    sink: Arc<dyn ParseErrorSink>,
) -> Result<Arc<dyn IndexerAdapter>, RegistryError> {
    let link = Url::parse(&config.url).map_err(|e| {
        RegistryError::Config(format!("indexer '{}': invalid url '{}': {}", config.id, config.url, e))
    })?;
    let credentials = Arc::new(StaticCredentialStore::new(Credentials::new(
        config.username.clone(),
        config.password.clone(),
    )));

    match config.kind {
        IndexerKind::XtremeZone => {
            let mut settings = XtremeZoneSettings::new(config.id.clone(), link, credentials);
            if let Some(name) = &config.name {
                settings = settings.with_name(name.clone());
            }
            if !config.categories.is_empty() {
                settings = settings.with_categories(CategoryTable::new(config.categories.clone()));
            }
            Ok(Arc::new(XtremeZoneIndexer::new(settings, transport, sink)))
        }
    }
}
