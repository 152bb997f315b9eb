//! Cache manager: the single authoritative entry point for cache access.
//!
//! Enforces the two-tier protocol:
//!
//! - reads: local tier first, remote on miss, backfill local on remote hit
//! - writes: remote first (the durable tier); local is mirrored only after
//!   remote success, so nothing is ever presented as cached that is not
//!   durably shared
//!
//! TTLs resolve from an explicit argument or the category table; a write
//! with neither is rejected. Values cross this boundary as typed
//! `Serialize`/`DeserializeOwned` data and are stored as JSON text, so no
//! tier ever guesses a value's type.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use attendance_cache_core::{CacheCategory, CacheError, Result, TtlPolicy};

use crate::local::LocalCache;
use crate::store::{RemoteStore, StoreStats};

/// Merged counters from both tiers, recomputed on demand.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Remote server-reported keyspace hits.
    pub hits: u64,
    /// Remote server-reported keyspace misses.
    pub misses: u64,
    /// Remote memory usage in bytes.
    pub memory_used_bytes: u64,
    /// Current local-tier entry count.
    pub local_entries: usize,
}

impl CacheStats {
    /// Hit rate as a percentage; 0 when there has been no traffic.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

/// Two-tier cache manager.
pub struct CacheManager {
    store: Arc<dyn RemoteStore>,
    local: LocalCache,
    ttl: TtlPolicy,
}

impl CacheManager {
    pub fn new(store: Arc<dyn RemoteStore>, local: LocalCache, ttl: TtlPolicy) -> Self {
        Self { store, local, ttl }
    }

    fn resolve_ttl(
        &self,
        key: &str,
        ttl_secs: Option<u64>,
        category: Option<CacheCategory>,
    ) -> Result<u64> {
        ttl_secs
            .or_else(|| category.map(|c| self.ttl.ttl_for(c)))
            .ok_or_else(|| CacheError::missing_ttl_policy(key))
    }

    /// Write a value to both tiers.
    ///
    /// Remote failure fails the whole write; the local tier is untouched
    /// in that case.
    pub async fn set<T>(
        &self,
        key: &str,
        value: &T,
        ttl_secs: Option<u64>,
        category: Option<CacheCategory>,
    ) -> Result<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let ttl = self.resolve_ttl(key, ttl_secs, category)?;
        let payload = serde_json::to_string(value)?;

        self.store.set_with_ttl(key, &payload, ttl).await?;
        self.local.set(key, payload, ttl);

        debug!(key = %key, ttl_secs = ttl, "cache set (remote+local)");
        Ok(())
    }

    /// Read a value, local tier first.
    ///
    /// A remote outage degrades to `Ok(None)` — cache unavailability must
    /// never hard-fail a read path. Undecodable payloads are surfaced as
    /// serialization errors, never coerced.
    pub async fn get<T>(&self, key: &str, category: Option<CacheCategory>) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        if let Some(payload) = self.local.get(key) {
            debug!(key = %key, "cache hit (local)");
            return Ok(Some(serde_json::from_str(&payload)?));
        }

        match self.store.get(key).await {
            Ok(Some(payload)) => {
                let value = serde_json::from_str(&payload)?;
                let ttl = category
                    .map(|c| self.ttl.ttl_for(c))
                    .unwrap_or_else(|| self.ttl.default_ttl());
                self.local.set(key, payload, ttl);
                debug!(key = %key, "cache hit (remote, backfilled local)");
                Ok(Some(value))
            }
            Ok(None) => {
                debug!(key = %key, "cache miss");
                Ok(None)
            }
            Err(e) if e.is_store_unavailable() => {
                warn!(key = %key, error = %e, "remote store unavailable, treating read as miss");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Delete from both tiers. Succeeds iff the remote deletion succeeds;
    /// the local removal is best-effort cleanup.
    pub async fn delete(&self, key: &str) -> Result<u64> {
        let removed = self.store.delete(key).await?;
        self.local.delete(key);
        debug!(key = %key, removed, "cache delete");
        Ok(removed)
    }

    /// Bulk-delete by glob pattern.
    ///
    /// The remote glob deletion is authoritative and its count is what is
    /// returned. The local tier supports only prefix matching, so it is
    /// cleaned with the literal prefix preceding the first wildcard — a
    /// best-effort measure against serving stale hot entries after a bulk
    /// invalidation.
    pub async fn delete_by_pattern(&self, pattern: &str) -> Result<u64> {
        let removed = self.store.delete_by_pattern(pattern).await?;
        let local_removed = self.local.delete_by_prefix(literal_prefix(pattern));
        debug!(pattern = %pattern, removed, local_removed, "cache pattern delete");
        Ok(removed)
    }

    /// True when either tier holds the key. Local is consulted first to
    /// avoid a network call; a remote outage degrades to false.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        if self.local.get(key).is_some() {
            return Ok(true);
        }
        match self.store.exists(key).await {
            Ok(present) => Ok(present),
            Err(e) if e.is_store_unavailable() => {
                warn!(key = %key, error = %e, "remote store unavailable, reporting key absent");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Reset a key's TTL in the remote store and mirror the new expiration
    /// into the local tier when the entry is present there.
    pub async fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool> {
        let updated = self.store.expire(key, ttl_secs).await?;
        self.local.set_expiry(key, ttl_secs);
        Ok(updated)
    }

    /// Merged statistics from both tiers.
    ///
    /// Remote counters degrade to zero on an outage; the local entry count
    /// is always current.
    pub async fn stats(&self) -> CacheStats {
        let remote = match self.store.stats().await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "remote store stats unavailable");
                StoreStats::default()
            }
        };
        CacheStats {
            hits: remote.hits,
            misses: remote.misses,
            memory_used_bytes: remote.memory_used_bytes,
            local_entries: self.local.len(),
        }
    }

    /// Local tier accessor (tests, sweeps, diagnostics).
    pub fn local(&self) -> &LocalCache {
        &self.local
    }
}

/// Literal portion of a glob pattern preceding the first wildcard.
fn literal_prefix(pattern: &str) -> &str {
    match pattern.find(['*', '?', '[']) {
        Some(idx) => &pattern[..idx],
        None => pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_prefix() {
        assert_eq!(literal_prefix("attendance:record:42:*"), "attendance:record:42:");
        assert_eq!(literal_prefix("attendance:schedule:42"), "attendance:schedule:42");
        assert_eq!(literal_prefix("a?c"), "a");
        assert_eq!(literal_prefix("*"), "");
    }

    #[test]
    fn test_hit_rate_zero_without_traffic() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_percentage() {
        let stats = CacheStats {
            hits: 90,
            misses: 10,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 90.0).abs() < f64::EPSILON);
    }
}
