//! Audience query engine
//!
//! Every query rebuilds its working set from a fresh store scan: keep the
//! ads that are live at `now` and satisfy every supplied predicate, order
//! them by `end_at`, then cut out the requested page. Nothing is cached.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use futures_util::future::ready;
use tracing::debug;

use crate::config::QueryConfig;
use crate::errors::Result;
use crate::storage::{Ad, AdStore, Gender, Platform};

/// Predicate set for a read. `None` means "not filtered on".
///
/// Values are trusted: the HTTP layer has already range- and enum-checked
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdQuery {
    pub age: Option<u8>,
    pub gender: Option<Gender>,
    pub country: Option<String>,
    pub platform: Option<Platform>,
}

impl AdQuery {
    /// AND of all supplied predicates against the ad's conditions.
    ///
    /// An ad without an age restriction stores `0..=0`, so it never matches
    /// an explicit age. Likewise an empty gender, country or platform
    /// condition never matches a supplied predicate.
    pub fn matches(&self, ad: &Ad) -> bool {
        let cond = &ad.conditions;

        if let Some(age) = self.age {
            let age = i32::from(age);
            if age < cond.age_start || age > cond.age_end {
                return false;
            }
        }

        if let Some(gender) = self.gender
            && cond.gender != gender.as_str()
        {
            return false;
        }

        if let Some(ref country) = self.country
            && !cond.country.iter().any(|c| c == country)
        {
            return false;
        }

        if let Some(platform) = self.platform
            && !cond.platform.iter().any(|p| p == platform.as_str())
        {
            return false;
        }

        true
    }
}

/// Page size policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl PageLimits {
    pub fn from_config(config: &QueryConfig) -> Self {
        Self {
            default_limit: config.default_limit,
            max_limit: config.max_limit,
        }
    }

    /// Requested limit if it is within `1..=max_limit`, else the default.
    pub fn effective_limit(&self, limit: Option<i64>) -> usize {
        match limit {
            Some(n) if n > 0 && n as u64 <= self.max_limit as u64 => n as usize,
            _ => self.default_limit,
        }
    }
}

impl Default for PageLimits {
    fn default() -> Self {
        Self::from_config(&QueryConfig::default())
    }
}

/// Stable sort by `end_at`, then slice `[offset, offset + limit)`.
///
/// Ties keep their input order, so a fixed scan order gives a fixed page.
pub fn sort_and_paginate(mut ads: Vec<Ad>, offset: usize, limit: usize) -> Vec<Ad> {
    if offset > ads.len() {
        return Vec::new();
    }
    ads.sort_by(|a, b| a.end_at.cmp(&b.end_at));
    let end = offset.saturating_add(limit).min(ads.len());
    ads.drain(offset..end).collect()
}

/// In-memory form of the whole pipeline over an already scanned set.
pub fn select_page(
    ads: impl IntoIterator<Item = Ad>,
    query: &AdQuery,
    now: DateTime<Utc>,
    offset: usize,
    limit: usize,
) -> Vec<Ad> {
    let matched: Vec<Ad> = ads
        .into_iter()
        .filter(|ad| ad.is_live_at(now) && query.matches(ad))
        .collect();
    sort_and_paginate(matched, offset, limit)
}

pub struct QueryEngine {
    store: Arc<AdStore>,
    limits: PageLimits,
}

impl QueryEngine {
    pub fn new(store: Arc<AdStore>, limits: PageLimits) -> Self {
        Self { store, limits }
    }

    pub fn limits(&self) -> PageLimits {
        self.limits
    }

    /// Page of ads matching `query` as of `now`.
    ///
    /// Filtering happens while the scan streams in, so only matches are
    /// held in memory. Storage failures propagate; corrupt records do not.
    pub async fn query(
        &self,
        query: &AdQuery,
        now: DateTime<Utc>,
        offset: usize,
        limit: Option<i64>,
    ) -> Result<Vec<Ad>> {
        let limit = self.limits.effective_limit(limit);

        let matched: Vec<Ad> = self
            .store
            .scan_ads()
            .try_filter(|ad| ready(ad.is_live_at(now) && query.matches(ad)))
            .try_collect()
            .await?;

        let total = matched.len();
        let page = sort_and_paginate(matched, offset, limit);
        debug!(
            "Query {:?} matched {} ads, returning {} (offset {}, limit {})",
            query,
            total,
            page.len(),
            offset,
            limit
        );
        Ok(page)
    }
}
