//! Ad service
//!
//! The boundary between the HTTP layer and the core: quota-gated creation,
//! audience queries, and the administrative counter reset.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use super::query::{AdQuery, PageLimits, QueryEngine};
use crate::errors::{AdError, Result};
use crate::storage::{Ad, AdStore};

/// Snapshot of the daily quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaStatus {
    pub used: i64,
    pub limit: i64,
}

pub struct AdService {
    store: Arc<AdStore>,
    engine: QueryEngine,
}

impl AdService {
    pub fn new(store: Arc<AdStore>, limits: PageLimits) -> Self {
        let engine = QueryEngine::new(store.clone(), limits);
        Self { store, engine }
    }

    pub fn store(&self) -> &Arc<AdStore> {
        &self.store
    }

    /// Store a validated ad if today's quota allows it.
    pub async fn create(&self, ad: Ad) -> Result<Ad> {
        let allowed = self.store.check_and_increment().await.map_err(|e| {
            error!("Failed to check daily ad creation limit: {}", e);
            e
        })?;
        if !allowed {
            return Err(AdError::quota_exceeded("Daily ad creation limit reached"));
        }

        self.store.save(&ad).await.map_err(|e| {
            error!("Failed to save ad '{}': {}", ad.title, e);
            e
        })?;
        info!("Ad '{}' created", ad.title);
        Ok(ad)
    }

    pub async fn list(
        &self,
        query: &AdQuery,
        now: DateTime<Utc>,
        offset: usize,
        limit: Option<i64>,
    ) -> Result<Vec<Ad>> {
        self.engine.query(query, now, offset, limit).await
    }

    pub async fn reset_counter(&self) -> Result<()> {
        self.store.reset_counter().await
    }

    pub async fn quota_status(&self) -> Result<QuotaStatus> {
        let used = self.store.counter().await?.unwrap_or(0);
        Ok(QuotaStatus {
            used,
            limit: self.store.options().daily_limit,
        })
    }
}
