//! Ad persistence and the daily creation quota
//!
//! Every ad lives under one key (prefix + title) with a fixed TTL. The quota
//! counter lives under a single well-known key. All reads go through a
//! cursor scan of the keyspace; there is no secondary index.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, BoxStream, StreamExt, TryStreamExt};
use tracing::{debug, info, trace, warn};

use super::backend::KvBackend;
use super::models::Ad;
use crate::config::StaticConfig;
use crate::errors::{AdError, Result};

/// Store settings, normally built from the static config.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub key_prefix: String,
    pub ad_ttl: Duration,
    pub scan_batch: usize,
    pub counter_key: String,
    pub daily_limit: i64,
    pub quota_window: Duration,
}

impl StoreOptions {
    pub fn from_config(config: &StaticConfig) -> Self {
        Self {
            key_prefix: config.store.key_prefix.clone(),
            ad_ttl: Duration::from_secs(config.store.ad_ttl_secs),
            scan_batch: config.store.scan_batch,
            counter_key: config.quota.counter_key.clone(),
            daily_limit: config.quota.daily_limit,
            quota_window: Duration::from_secs(config.quota.window_secs),
        }
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::from_config(&StaticConfig::default())
    }
}

pub struct AdStore {
    backend: Arc<dyn KvBackend>,
    options: StoreOptions,
}

impl AdStore {
    pub fn new(backend: Arc<dyn KvBackend>, options: StoreOptions) -> Self {
        Self { backend, options }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub async fn ping(&self) -> Result<()> {
        self.backend.ping().await
    }

    fn ad_key(&self, title: &str) -> String {
        format!("{}{}", self.options.key_prefix, title)
    }

    /// Write an ad under its title with the configured TTL.
    ///
    /// An existing ad with the same title is silently replaced.
    pub async fn save(&self, ad: &Ad) -> Result<()> {
        let payload = serde_json::to_string(ad)
            .map_err(|e| AdError::encoding(format!("Failed to encode ad '{}': {e}", ad.title)))?;

        self.backend
            .set_ex(&self.ad_key(&ad.title), &payload, self.options.ad_ttl)
            .await?;
        trace!("Saved ad '{}' ({} bytes)", ad.title, payload.len());
        Ok(())
    }

    /// Lazily walk every live key under the prefix, yielding `(key, raw value)`.
    ///
    /// Each call starts a fresh cursor scan. Keys that expire between the
    /// scan page and the read are dropped, duplicates returned by the cursor
    /// are suppressed, and the quota counter key is never yielded. A backend
    /// failure is yielded as an error item and ends the scan.
    pub fn scan_all(&self) -> BoxStream<'_, Result<(String, String)>> {
        // outer None: scan finished; inner None: first page
        let init: (Option<Option<String>>, HashSet<String>) = (Some(None), HashSet::new());

        stream::try_unfold(init, move |(cursor, mut seen)| async move {
            let Some(cursor) = cursor else {
                return Ok::<_, AdError>(None);
            };

            let page = self
                .backend
                .scan(
                    cursor.as_deref(),
                    &self.options.key_prefix,
                    self.options.scan_batch,
                )
                .await?;

            let keys: Vec<String> = page
                .keys
                .into_iter()
                .filter(|key| *key != self.options.counter_key && seen.insert(key.clone()))
                .collect();
            let values = self.backend.mget(&keys).await?;

            let entries: Vec<(String, String)> = keys
                .into_iter()
                .zip(values)
                .filter_map(|(key, value)| value.map(|raw| (key, raw)))
                .collect();

            Ok(Some((entries, (page.next.map(Some), seen))))
        })
        .map_ok(|entries| stream::iter(entries.into_iter().map(Ok::<_, AdError>)))
        .try_flatten()
        .boxed()
    }

    /// `scan_all` decoded into ads. Undecodable records are logged and skipped.
    pub fn scan_ads(&self) -> BoxStream<'_, Result<Ad>> {
        self.scan_all()
            .try_filter_map(|(key, raw)| async move {
                match serde_json::from_str::<Ad>(&raw) {
                    Ok(ad) => Ok(Some(ad)),
                    Err(e) => {
                        warn!("Skipping undecodable record under key '{}': {}", key, e);
                        Ok(None)
                    }
                }
            })
            .boxed()
    }

    /// Collect a full scan into memory.
    pub async fn load_ads(&self) -> Result<Vec<Ad>> {
        let ads: Vec<Ad> = self.scan_ads().try_collect().await?;
        debug!("Loaded {} ads from {}", ads.len(), self.backend.name());
        Ok(ads)
    }

    /// Admit one ad creation against the daily quota.
    ///
    /// 1. `SET NX` the counter to 1: first creation of the window.
    /// 2. Otherwise `INCR`; a result within the limit is admitted.
    /// 3. Otherwise `DECR` to roll back and refuse.
    ///
    /// Whenever `INCR` or `DECR` may have recreated an expired counter, a
    /// counter left without a TTL gets a fresh window.
    ///
    /// Each `INCR` hands out a distinct value, so no more than `daily_limit`
    /// callers are admitted per window however many run concurrently. A
    /// reader racing a refused caller can briefly see the counter above the
    /// limit, until that caller's `DECR` lands.
    pub async fn check_and_increment(&self) -> Result<bool> {
        let key = &self.options.counter_key;
        let limit = self.options.daily_limit;
        let window = self.options.quota_window;

        if limit <= 0 {
            warn!("Daily ad creation limit is {}, refusing", limit);
            return Ok(false);
        }

        if self.backend.set_nx_ex(key, "1", window).await? {
            info!("Ad creation quota window opened (limit {})", limit);
            return Ok(true);
        }

        let count = self.backend.incr(key).await?;
        if count <= 1 {
            self.ensure_window(key, window).await?;
        }

        if count <= limit {
            trace!("Ad creation admitted ({}/{})", count, limit);
            return Ok(true);
        }

        let rolled_back = self.backend.decr(key).await?;
        if rolled_back < 0 {
            // the window closed between INCR and DECR; DECR recreated the key
            self.ensure_window(key, window).await?;
        }
        warn!("Daily ad creation limit reached ({})", limit);
        Ok(false)
    }

    /// Arm the window TTL on a counter that `INCR`/`DECR` recreated without
    /// one. A counter that still has a TTL (e.g. from `reset_counter`) keeps
    /// it.
    async fn ensure_window(&self, key: &str, window: Duration) -> Result<()> {
        if self.backend.ttl(key).await?.is_none() {
            debug!("Quota counter has no expiry, arming a {:?} window", window);
            self.backend.expire(key, window).await?;
        }
        Ok(())
    }

    /// Force the counter back to 0 with a fresh window.
    pub async fn reset_counter(&self) -> Result<()> {
        self.backend
            .set_ex(&self.options.counter_key, "0", self.options.quota_window)
            .await?;
        info!("Ad creation counter reset");
        Ok(())
    }

    /// Current counter value; `None` when no window is open.
    pub async fn counter(&self) -> Result<Option<i64>> {
        match self.backend.get(&self.options.counter_key).await? {
            Some(raw) => raw.parse::<i64>().map(Some).map_err(|e| {
                AdError::encoding(format!("Quota counter holds a non-integer value: {e}"))
            }),
            None => Ok(None),
        }
    }
}
