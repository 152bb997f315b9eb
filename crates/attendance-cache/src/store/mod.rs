//! Remote store tier.
//!
//! The remote tier is any key-value store exposing string get/set with
//! expiry, deletion, server-side glob deletion, and INFO-style counters.
//! [`RedisStore`] is the production client; [`MemoryStore`] implements the
//! same contract in-process for tests and single-node development.

mod memory;
mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

use async_trait::async_trait;

use attendance_cache_core::Result;

/// Server-reported counters from the remote store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub hits: u64,
    pub misses: u64,
    pub memory_used_bytes: u64,
    pub connected_clients: u64,
}

/// Thin client contract over the remote key-value store.
///
/// Every method is a network call that may fail with
/// [`CacheError::StoreUnavailable`](attendance_cache_core::CacheError::StoreUnavailable).
/// The client never retries internally; the cache manager decides how to
/// degrade. Values are opaque strings — serialization semantics live above
/// this trait.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// Returns the number of keys removed (0 or 1).
    async fn delete(&self, key: &str) -> Result<u64>;

    /// Delete every key matching a glob pattern. Returns the removed count.
    async fn delete_by_pattern(&self, pattern: &str) -> Result<u64>;

    /// Reset a key's TTL. Returns false when the key does not exist.
    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool>;

    async fn exists(&self, key: &str) -> Result<bool>;

    async fn stats(&self) -> Result<StoreStats>;
}
