//! In-process remote-store fake.
//!
//! Implements the full [`RemoteStore`] contract against a local map:
//! server-side expiry, glob pattern deletion, and hit/miss counters. Used
//! by the test suite (with a manual clock and an outage toggle) and usable
//! as a single-node stand-in when no Redis is deployed.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use attendance_cache_core::{CacheError, Clock, Result};

use super::{RemoteStore, StoreStats};

struct StoredValue {
    value: String,
    expires_at_epoch_secs: i64,
}

pub struct MemoryStore {
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, StoredValue>>,
    hits: AtomicU64,
    misses: AtomicU64,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Simulate a store outage: while set, every operation fails with
    /// `StoreUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = self.clock.now_epoch_secs();
        self.entries
            .lock()
            .values()
            .filter(|v| v.expires_at_epoch_secs > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(CacheError::store_unavailable("simulated outage"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        let now = self.clock.now_epoch_secs();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(stored) if stored.expires_at_epoch_secs > now => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(stored.value.clone()))
            }
            Some(_) => {
                entries.remove(key);
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        self.check_available()?;
        let now = self.clock.now_epoch_secs();
        self.entries.lock().insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at_epoch_secs: now.saturating_add(ttl_secs as i64),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<u64> {
        self.check_available()?;
        Ok(self.entries.lock().remove(key).map_or(0, |_| 1))
    }

    async fn delete_by_pattern(&self, pattern: &str) -> Result<u64> {
        self.check_available()?;
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|key, _| !glob_match(pattern, key));
        Ok((before - entries.len()) as u64)
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool> {
        self.check_available()?;
        let now = self.clock.now_epoch_secs();
        let mut entries = self.entries.lock();
        match entries.get_mut(key) {
            Some(stored) if stored.expires_at_epoch_secs > now => {
                stored.expires_at_epoch_secs = now.saturating_add(ttl_secs as i64);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.check_available()?;
        let now = self.clock.now_epoch_secs();
        Ok(self
            .entries
            .lock()
            .get(key)
            .is_some_and(|stored| stored.expires_at_epoch_secs > now))
    }

    async fn stats(&self) -> Result<StoreStats> {
        self.check_available()?;
        let memory_used_bytes = self
            .entries
            .lock()
            .iter()
            .map(|(k, v)| (k.len() + v.value.len()) as u64)
            .sum();
        Ok(StoreStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            memory_used_bytes,
            connected_clients: 1,
        })
    }
}

/// Glob match supporting `*` (any run of characters) and `?` (one
/// character) — the subset Redis patterns use for key invalidation here.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    // Iterative wildcard matcher with single-star backtracking.
    let (mut p, mut t) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if let Some((star_p, star_t)) = star {
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }
    p == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_cache_core::ManualClock;

    fn store() -> (MemoryStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000));
        (MemoryStore::new(clock.clone()), clock)
    }

    #[test]
    fn test_glob_match() {
        assert!(glob_match("attendance:record:42:*", "attendance:record:42:2025-11-17"));
        assert!(!glob_match("attendance:record:42:*", "attendance:record:43:2025-11-17"));
        assert!(glob_match("attendance:schedule:42", "attendance:schedule:42"));
        assert!(!glob_match("attendance:schedule:42", "attendance:schedule:421"));
        assert!(glob_match("*", "anything"));
        assert!(glob_match("a?c", "abc"));
        assert!(!glob_match("a?c", "ac"));
        assert!(glob_match("a*b*c", "a-long-b-tail-c"));
        assert!(!glob_match("a*b*c", "a-long-b-tail"));
    }

    #[tokio::test]
    async fn test_round_trip_and_expiry() {
        let (store, clock) = store();
        store.set_with_ttl("k", "v", 60).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        clock.advance_secs(61);
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expire_refreshes_live_entry_only() {
        let (store, clock) = store();
        store.set_with_ttl("k", "v", 10).await.unwrap();
        assert!(store.expire("k", 100).await.unwrap());
        clock.advance_secs(50);
        assert!(store.exists("k").await.unwrap());
        clock.advance_secs(51);
        assert!(!store.expire("k", 100).await.unwrap());
    }

    #[tokio::test]
    async fn test_outage_toggle() {
        let (store, _) = store();
        store.set_unavailable(true);
        let err = store.get("k").await.unwrap_err();
        assert!(err.is_store_unavailable());
        store.set_unavailable(false);
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stats_counts_hits_and_misses() {
        let (store, _) = store();
        store.set_with_ttl("k", "v", 60).await.unwrap();
        store.get("k").await.unwrap();
        store.get("absent").await.unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!(stats.memory_used_bytes > 0);
    }
}
