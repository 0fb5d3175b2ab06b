use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::{KvBackend, ScanPage};
use crate::errors::{AdError, Result};

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryEntry {
    fn new(value: &str, ttl: Option<Duration>) -> Self {
        Self {
            value: value.to_string(),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-process backend with Redis-like semantics.
///
/// Every mutating call goes through a single `DashMap` shard lock for its
/// key, which gives the same per-key atomicity Redis gives single commands.
/// Expired entries are dropped on access and swept at the start of every
/// scan.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<DashMap<String, MemoryEntry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.inner.iter().filter(|e| !e.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn purge_expired(&self, now: Instant) {
        self.inner.retain(|_, e| !e.is_expired(now));
    }

    fn add(&self, key: &str, delta: i64) -> Result<i64> {
        let now = Instant::now();
        let mut entry = self
            .inner
            .entry(key.to_string())
            .or_insert_with(|| MemoryEntry::new("0", None));
        if entry.is_expired(now) {
            *entry = MemoryEntry::new("0", None);
        }

        let current: i64 = entry
            .value
            .parse()
            .map_err(|_| AdError::storage("ERR value is not an integer or out of range"))?;
        let next = current + delta;
        entry.value = next.to_string();
        Ok(next)
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let expired = match self.inner.get(key) {
            Some(entry) if !entry.is_expired(now) => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.inner.remove_if(key, |_, e| e.is_expired(now));
        }
        Ok(None)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.inner
            .insert(key.to_string(), MemoryEntry::new(value, Some(ttl)));
        Ok(())
    }

    async fn set_nx_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let now = Instant::now();
        match self.inner.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.insert(MemoryEntry::new(value, Some(ttl)));
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(MemoryEntry::new(value, Some(ttl)));
                Ok(true)
            }
        }
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        self.add(key, 1)
    }

    async fn decr(&self, key: &str) -> Result<i64> {
        self.add(key, -1)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        if let Some(mut entry) = self.inner.get_mut(key)
            && !entry.is_expired(now)
        {
            entry.expires_at = Some(now + ttl);
        }
        Ok(())
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let now = Instant::now();
        Ok(self
            .inner
            .get(key)
            .filter(|e| !e.is_expired(now))
            .and_then(|e| e.expires_at)
            .map(|at| at.saturating_duration_since(now)))
    }

    /// The cursor is the last key of the previous page, so a page resumes
    /// strictly after it no matter what expired in between.
    async fn scan(&self, cursor: Option<&str>, prefix: &str, count: usize) -> Result<ScanPage> {
        let now = Instant::now();
        if cursor.is_none() {
            self.purge_expired(now);
        }

        let mut keys: Vec<String> = self
            .inner
            .iter()
            .filter(|e| e.key().starts_with(prefix) && !e.is_expired(now))
            .filter(|e| cursor.is_none_or(|last| e.key().as_str() > last))
            .map(|e| e.key().clone())
            .collect();
        keys.sort_unstable();

        let count = count.max(1);
        let next = (keys.len() > count).then(|| keys[count - 1].clone());
        keys.truncate(count);

        Ok(ScanPage { next, keys })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: Duration = Duration::from_secs(86400);

    #[tokio::test]
    async fn test_set_and_get() {
        let backend = MemoryBackend::new();
        backend.set_ex("a", "1", DAY).await.unwrap();
        assert_eq!(backend.get("a").await.unwrap(), Some("1".to_string()));
        assert_eq!(backend.get("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let backend = MemoryBackend::new();
        backend
            .set_ex("short", "v", Duration::from_millis(20))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(backend.get("short").await.unwrap(), None);
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_set_nx_only_writes_once() {
        let backend = MemoryBackend::new();
        assert!(backend.set_nx_ex("k", "1", DAY).await.unwrap());
        assert!(!backend.set_nx_ex("k", "2", DAY).await.unwrap());
        assert_eq!(backend.get("k").await.unwrap(), Some("1".to_string()));
    }

    #[tokio::test]
    async fn test_set_nx_replaces_expired_key() {
        let backend = MemoryBackend::new();
        backend
            .set_ex("k", "old", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(backend.set_nx_ex("k", "new", DAY).await.unwrap());
        assert_eq!(backend.get("k").await.unwrap(), Some("new".to_string()));
    }

    #[tokio::test]
    async fn test_incr_decr() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.incr("c").await.unwrap(), 1);
        assert_eq!(backend.incr("c").await.unwrap(), 2);
        assert_eq!(backend.decr("c").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_incr_non_integer_fails() {
        let backend = MemoryBackend::new();
        backend.set_ex("c", "abc", DAY).await.unwrap();
        assert!(matches!(
            backend.incr("c").await,
            Err(AdError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_scan_pages_through_prefix() {
        let backend = MemoryBackend::new();
        for i in 0..7 {
            backend
                .set_ex(&format!("ad:{i}"), "v", DAY)
                .await
                .unwrap();
        }
        backend.set_ex("other", "v", DAY).await.unwrap();

        let mut cursor: Option<String> = None;
        let mut seen = Vec::new();
        loop {
            let page = backend.scan(cursor.as_deref(), "ad:", 3).await.unwrap();
            assert!(page.keys.len() <= 3);
            seen.extend(page.keys);
            cursor = page.next;
            if cursor.is_none() {
                break;
            }
        }
        assert_eq!(seen.len(), 7);
        assert!(seen.iter().all(|k| k.starts_with("ad:")));
    }

    #[tokio::test]
    async fn test_scan_resumes_after_earlier_key_expires() {
        let backend = MemoryBackend::new();
        backend
            .set_ex("a", "v", Duration::from_millis(20))
            .await
            .unwrap();
        for key in ["b", "c", "d"] {
            backend.set_ex(key, "v", DAY).await.unwrap();
        }

        let first = backend.scan(None, "", 2).await.unwrap();
        assert_eq!(first.keys, vec!["a", "b"]);

        tokio::time::sleep(Duration::from_millis(40)).await;

        let second = backend
            .scan(first.next.as_deref(), "", 2)
            .await
            .unwrap();
        assert_eq!(second.keys, vec!["c", "d"]);
        assert_eq!(second.next, None);
    }

    #[tokio::test]
    async fn test_scan_sweeps_expired_entries() {
        let backend = MemoryBackend::new();
        for i in 0..5 {
            backend
                .set_ex(&format!("gone:{i}"), "v", Duration::from_millis(10))
                .await
                .unwrap();
        }
        backend.set_ex("kept", "v", DAY).await.unwrap();
        assert_eq!(backend.inner.len(), 6);

        tokio::time::sleep(Duration::from_millis(30)).await;
        let page = backend.scan(None, "", 100).await.unwrap();

        assert_eq!(page.keys, vec!["kept"]);
        assert_eq!(backend.inner.len(), 1);
    }

    #[tokio::test]
    async fn test_ttl() {
        let backend = MemoryBackend::new();
        backend.set_ex("k", "v", DAY).await.unwrap();
        let ttl = backend.ttl("k").await.unwrap().unwrap();
        assert!(ttl > Duration::from_secs(86000) && ttl <= DAY);

        backend.incr("counter").await.unwrap();
        assert_eq!(backend.ttl("counter").await.unwrap(), None);
        assert_eq!(backend.ttl("missing").await.unwrap(), None);
    }
}
