use std::sync::Arc;

use tracing::info;

use crate::config::StaticConfig;
use crate::errors::Result;

pub mod ad_store;
pub mod backend;
pub mod models;

pub use ad_store::{AdStore, StoreOptions};
pub use backend::{KvBackend, MemoryBackend, RedisBackend, ScanPage};
pub use models::{Ad, Conditions, Gender, Platform};

/// URL scheme selecting the in-process backend.
pub const MEMORY_URL_SCHEME: &str = "memory://";

pub struct StorageFactory;

impl StorageFactory {
    /// Build the backend named by `store.url` and wrap it in an `AdStore`.
    pub async fn create(config: &StaticConfig) -> Result<Arc<AdStore>> {
        let backend = Self::create_backend(&config.store.url).await?;
        info!("Using storage backend: {}", backend.name());
        Ok(Arc::new(AdStore::new(
            backend,
            StoreOptions::from_config(config),
        )))
    }

    pub async fn create_backend(url: &str) -> Result<Arc<dyn KvBackend>> {
        if url.starts_with(MEMORY_URL_SCHEME) {
            return Ok(Arc::new(MemoryBackend::new()));
        }
        Ok(Arc::new(RedisBackend::connect(url).await?))
    }
}
