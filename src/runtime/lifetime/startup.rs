use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::StaticConfig;
use crate::services::{AdService, PageLimits};
use crate::storage::{AdStore, StorageFactory};
use crate::utils::{CountryCatalog, Iso3166Catalog};

pub struct StartupContext {
    pub store: Arc<AdStore>,
    pub ad_service: Arc<AdService>,
    pub countries: Arc<dyn CountryCatalog>,
}

/// Make `ring` the process-wide TLS provider for `rediss://` connections.
///
/// A second call is a no-op.
pub fn install_crypto_provider() -> Result<()> {
    if rustls::crypto::CryptoProvider::get_default().is_some() {
        return Ok(());
    }
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|e| anyhow::anyhow!("Failed to install rustls crypto provider: {:?}", e))
}

/// Connect the store and build the services shared by every mode.
pub async fn build_services(config: &StaticConfig) -> Result<(Arc<AdStore>, Arc<AdService>)> {
    install_crypto_provider()?;

    let store = StorageFactory::create(config)
        .await
        .context("Failed to create storage backend")?;
    let ad_service = Arc::new(AdService::new(
        store.clone(),
        PageLimits::from_config(&config.query),
    ));
    Ok((store, ad_service))
}

/// Prepare everything the HTTP server needs.
///
/// The backend must answer a ping before the server binds.
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let (store, ad_service) = build_services(config).await?;
    store
        .ping()
        .await
        .context("Storage backend is not reachable")?;

    let quota = ad_service
        .quota_status()
        .await
        .context("Failed to read ad creation counter")?;
    info!(
        "Daily ad creation quota: {}/{} used",
        quota.used, quota.limit
    );

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        store,
        ad_service,
        countries: Arc::new(Iso3166Catalog),
    })
}
