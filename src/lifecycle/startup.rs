//! Startup orchestration.
//!
//! Builds the store, registers the well-known keys, then builds the engine
//! and resolver. Any failure here is fatal.

use std::sync::Arc;
use thiserror::Error;

use crate::config::{ResolverConfig, StoreBackend, StoreConfig};
use crate::resolver::Resolver;
use crate::store::{register_keys, FileStore, MemoryStore, Store, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("key registration failed: {0}")]
    Registration(#[from] StoreError),
}

/// Everything the binaries need after startup.
pub struct Services {
    pub store: Arc<dyn Store>,
    pub resolver: Arc<Resolver>,
}

pub fn open_store(config: &StoreConfig) -> Arc<dyn Store> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory store");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::File => {
            tracing::info!(path = %config.path.display(), "Using file store");
            Arc::new(FileStore::open(&config.path))
        }
    }
}

pub fn bootstrap(config: &ResolverConfig) -> Result<Services, StartupError> {
    let store = open_store(&config.store);
    bootstrap_with_store(config, store)
}

/// Same as [`bootstrap`] with a caller-provided store.
pub fn bootstrap_with_store(
    config: &ResolverConfig,
    store: Arc<dyn Store>,
) -> Result<Services, StartupError> {
    let created = register_keys(store.as_ref(), &config.registration)?;
    tracing::info!(
        created,
        registered = config.registration.len(),
        "Configuration keys registered"
    );

    let resolver = Arc::new(Resolver::from_config(Arc::clone(&store), &config.resolution));
    tracing::info!(
        budget_secs = config.resolution.budget_secs,
        backoff_secs = config.resolution.backoff_secs,
        share_tasks = config.resolution.share_tasks,
        "Resolver ready"
    );

    Ok(Services { store, resolver })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bootstrap_registers_keys() {
        let mut config = ResolverConfig::default();
        config.store.backend = StoreBackend::Memory;

        let services = bootstrap(&config).unwrap();
        let entries = services.store.entries().unwrap();
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|e| e.value.is_empty()));
        assert_eq!(services.resolver.engine().in_flight(), 0);
    }

    #[tokio::test]
    async fn test_bootstrap_keeps_existing_values() {
        let store = MemoryStore::new();
        store.put("bot.token", "123:abc", "Telegram bot token").unwrap();

        let services = bootstrap_with_store(&ResolverConfig::default(), Arc::new(store)).unwrap();
        assert_eq!(services.store.get("bot.token").unwrap().as_deref(), Some("123:abc"));
    }
}
