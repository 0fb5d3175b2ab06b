//! Key-value backend abstraction
//!
//! The ad store only needs a handful of single-key primitives with
//! per-key expiration. Each one must be atomic on its own; the store never
//! assumes atomicity across calls.

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::Result;

pub mod memory;
pub mod redis;

pub use self::memory::MemoryBackend;
pub use self::redis::RedisBackend;

/// One page of an incremental key scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Opaque cursor for the next call; `None` means the scan is complete.
    pub next: Option<String>,
    pub keys: Vec<String>,
}

#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Short backend name for logs and health output.
    fn name(&self) -> &'static str;

    async fn ping(&self) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Batched read; the result is aligned with `keys`.
    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push(self.get(key).await?);
        }
        Ok(values)
    }

    /// Unconditional write with expiry.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Write with expiry only when the key is absent. Returns whether it wrote.
    async fn set_nx_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<bool>;

    /// Atomic increment. A missing key counts as 0 and is created without expiry.
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Atomic decrement, same missing-key rule as `incr`.
    async fn decr(&self, key: &str) -> Result<i64>;

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()>;

    /// Remaining time to live; `None` when the key is missing or never expires.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>>;

    /// Incremental scan over live keys starting with `prefix`.
    ///
    /// Start with `None`; keep calling with the returned cursor until it
    /// comes back as `None`. Every key live for the whole scan is returned at
    /// least once. Keys may repeat across pages and no order is promised.
    async fn scan(&self, cursor: Option<&str>, prefix: &str, count: usize) -> Result<ScanPage>;
}
