//! Two-tier cache for attendance domain data.
//!
//! ## Architecture
//!
//! - **Local tier**: bounded in-process map, microsecond latency, per instance
//! - **Remote tier**: shared Redis-compatible key-value store, the durable tier
//!
//! Reads try the local tier first and fall through to the remote store on a
//! miss, backfilling the local tier on a remote hit. Writes go to the remote
//! store first and mirror into the local tier only after remote success.
//!
//! ## Graceful Degradation
//!
//! Remote unavailability never hard-fails a read: `get` degrades to a cache
//! miss so the caller recomputes from the system of record. Writes and
//! deletes propagate remote failures, since silently dropping them could
//! leave stale data behind.

pub mod config;
pub mod facade;
pub mod local;
pub mod manager;
pub mod store;
pub mod warmup;

pub use attendance_cache_core::{
    CacheCategory, CacheError, Clock, KeyBuilder, ManualClock, Result, RuleScope, SystemClock,
    TtlPolicy,
};
pub use config::{CacheConfig, RedisConfig};
pub use facade::AttendanceCache;
pub use local::LocalCache;
pub use manager::{CacheManager, CacheStats};
pub use store::{MemoryStore, RedisStore, RemoteStore, StoreStats};
pub use warmup::{WarmupReport, WarmupRunner, WarmupTask};

use std::sync::Arc;

/// Wire a cache manager from configuration and an already-constructed store.
///
/// The store is injected rather than created here so tests (and hosts with
/// their own pool management) can substitute [`MemoryStore`] or a custom
/// [`RemoteStore`] implementation.
pub fn build_manager(
    config: &CacheConfig,
    store: Arc<dyn RemoteStore>,
    clock: Arc<dyn Clock>,
) -> Result<CacheManager> {
    config
        .validate()
        .map_err(attendance_cache_core::CacheError::configuration)?;
    let ttl = config.ttl_policy()?;
    let local = LocalCache::new(config.local_capacity, clock);
    Ok(CacheManager::new(store, local, ttl))
}
