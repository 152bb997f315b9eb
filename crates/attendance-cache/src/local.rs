//! Local (in-process) cache tier.
//!
//! A bounded map with per-entry absolute expiration. Expired entries are
//! removed lazily on access; a periodic [`LocalCache::sweep_expired`] call
//! MAY run to bound memory but is not required for correctness. All
//! operations share one coarse mutex, which is sufficient here: entries
//! are small and every operation is an O(1) map access.
//!
//! The local tier only approximates remote pattern deletion: it supports
//! prefix matching, not globs. All domain keys are prefix-structured, so
//! the prefix cleanup is enough to keep hot entries from going stale after
//! a bulk invalidation. Over-removal only costs a re-fetch.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use attendance_cache_core::Clock;

struct LocalEntry {
    value: String,
    expires_at_epoch_secs: i64,
    seq: u64,
}

struct LocalState {
    entries: HashMap<String, LocalEntry>,
    next_seq: u64,
}

/// Bounded, thread-safe in-process cache with lazy TTL expiration.
pub struct LocalCache {
    capacity: usize,
    clock: Arc<dyn Clock>,
    state: Mutex<LocalState>,
}

impl LocalCache {
    pub fn new(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            capacity,
            clock,
            state: Mutex::new(LocalState {
                entries: HashMap::new(),
                next_seq: 0,
            }),
        }
    }

    /// Get a live value. An expired entry is treated as absent and
    /// physically removed on this access.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now_epoch_secs();
        let mut state = self.state.lock();
        match state.entries.get(key) {
            Some(entry) if entry.expires_at_epoch_secs > now => Some(entry.value.clone()),
            Some(_) => {
                state.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or replace an entry with an absolute expiration `ttl_secs`
    /// from now. Evicts when full: expired entries first, then the oldest
    /// insertion (FIFO).
    pub fn set(&self, key: &str, value: String, ttl_secs: u64) {
        let now = self.clock.now_epoch_secs();
        let mut state = self.state.lock();

        if !state.entries.contains_key(key) && state.entries.len() >= self.capacity {
            state
                .entries
                .retain(|_, entry| entry.expires_at_epoch_secs > now);
            if state.entries.len() >= self.capacity {
                let oldest = state
                    .entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.seq)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    state.entries.remove(&oldest);
                }
            }
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.entries.insert(
            key.to_string(),
            LocalEntry {
                value,
                expires_at_epoch_secs: now.saturating_add(ttl_secs as i64),
                seq,
            },
        );
    }

    /// Remove one entry. Returns whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        self.state.lock().entries.remove(key).is_some()
    }

    /// Remove every entry whose key starts with `prefix`.
    pub fn delete_by_prefix(&self, prefix: &str) -> u64 {
        let mut state = self.state.lock();
        let before = state.entries.len();
        state.entries.retain(|key, _| !key.starts_with(prefix));
        (before - state.entries.len()) as u64
    }

    /// Move an existing entry's expiration to `ttl_secs` from now.
    /// Returns false when the key is absent or already expired.
    pub fn set_expiry(&self, key: &str, ttl_secs: u64) -> bool {
        let now = self.clock.now_epoch_secs();
        let mut state = self.state.lock();
        match state.entries.get_mut(key) {
            Some(entry) if entry.expires_at_epoch_secs > now => {
                entry.expires_at_epoch_secs = now.saturating_add(ttl_secs as i64);
                true
            }
            _ => false,
        }
    }

    /// Drop all expired entries. Returns how many were removed.
    pub fn sweep_expired(&self) -> u64 {
        let now = self.clock.now_epoch_secs();
        let mut state = self.state.lock();
        let before = state.entries.len();
        state
            .entries
            .retain(|_, entry| entry.expires_at_epoch_secs > now);
        (before - state.entries.len()) as u64
    }

    /// Current entry count, including not-yet-swept expired entries.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove everything.
    pub fn clear(&self) {
        self.state.lock().entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendance_cache_core::ManualClock;

    fn cache_with_clock(capacity: usize) -> (LocalCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000));
        (LocalCache::new(capacity, clock.clone()), clock)
    }

    #[test]
    fn test_set_get_round_trip() {
        let (cache, _) = cache_with_clock(10);
        cache.set("a", "1".into(), 60);
        assert_eq!(cache.get("a").as_deref(), Some("1"));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_lazy_expiration_removes_entry() {
        let (cache, clock) = cache_with_clock(10);
        cache.set("a", "1".into(), 1800);
        clock.advance_secs(1801);
        assert_eq!(cache.get("a"), None);
        // Physically removed by the expired read, not just hidden.
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_entry_live_at_exact_ttl_boundary() {
        let (cache, clock) = cache_with_clock(10);
        cache.set("a", "1".into(), 60);
        clock.advance_secs(59);
        assert!(cache.get("a").is_some());
        clock.advance_secs(1);
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn test_delete_by_prefix() {
        let (cache, _) = cache_with_clock(10);
        cache.set("attendance:record:42:2025-11-17", "a".into(), 60);
        cache.set("attendance:record:42:2025-11-18", "b".into(), 60);
        cache.set("attendance:record:43:2025-11-17", "c".into(), 60);
        assert_eq!(cache.delete_by_prefix("attendance:record:42:"), 2);
        assert!(cache.get("attendance:record:43:2025-11-17").is_some());
    }

    #[test]
    fn test_capacity_evicts_expired_before_live() {
        let (cache, clock) = cache_with_clock(2);
        cache.set("dead", "x".into(), 10);
        cache.set("live", "y".into(), 1000);
        clock.advance_secs(11);
        cache.set("new", "z".into(), 1000);
        assert_eq!(cache.get("live").as_deref(), Some("y"));
        assert_eq!(cache.get("new").as_deref(), Some("z"));
        assert_eq!(cache.get("dead"), None);
    }

    #[test]
    fn test_capacity_evicts_oldest_insertion() {
        let (cache, _) = cache_with_clock(2);
        cache.set("first", "1".into(), 1000);
        cache.set("second", "2".into(), 1000);
        cache.set("third", "3".into(), 1000);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("first"), None);
        assert!(cache.get("second").is_some());
        assert!(cache.get("third").is_some());
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let (cache, _) = cache_with_clock(2);
        cache.set("a", "1".into(), 1000);
        cache.set("b", "2".into(), 1000);
        cache.set("a", "3".into(), 1000);
        assert_eq!(cache.get("a").as_deref(), Some("3"));
        assert!(cache.get("b").is_some());
    }

    #[test]
    fn test_set_expiry_extends_live_entry() {
        let (cache, clock) = cache_with_clock(10);
        cache.set("a", "1".into(), 10);
        assert!(cache.set_expiry("a", 1000));
        clock.advance_secs(500);
        assert!(cache.get("a").is_some());
        assert!(!cache.set_expiry("missing", 10));
    }

    #[test]
    fn test_sweep_expired() {
        let (cache, clock) = cache_with_clock(10);
        cache.set("a", "1".into(), 10);
        cache.set("b", "2".into(), 1000);
        clock.advance_secs(11);
        assert_eq!(cache.sweep_expired(), 1);
        assert_eq!(cache.len(), 1);
    }
}
