//! Configuration surface consumed at construction time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use attendance_cache_core::{CacheCategory, Result, TtlPolicy};

/// Redis connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Connection URL, e.g. `redis://:secret@localhost:6379/2`
    /// (credential and database index travel in the URL).
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Connection pool size.
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: usize,

    /// Timeout applied to pool wait/create/recycle, in milliseconds.
    /// A remote call that exceeds it is treated as a failure, never hung.
    #[serde(default = "default_redis_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_pool_size() -> usize {
    16
}

fn default_redis_timeout_ms() -> u64 {
    2000
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
            timeout_ms: default_redis_timeout_ms(),
        }
    }
}

impl RedisConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err("redis.url must start with redis:// or rediss://".into());
        }
        if self.pool_size == 0 {
            return Err("redis.pool_size must be > 0".into());
        }
        if self.timeout_ms == 0 {
            return Err("redis.timeout_ms must be > 0".into());
        }
        Ok(())
    }
}

/// Cache manager configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Namespace prefix every key is built under.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Fallback TTL in seconds for writes without a category.
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,

    /// Upper bound on local-tier entries.
    #[serde(default = "default_local_capacity")]
    pub local_capacity: usize,

    /// Per-category TTL overrides, keyed by category name
    /// (e.g. `attendance_record = 900`).
    #[serde(default)]
    pub ttl_overrides: HashMap<String, u64>,
}

fn default_namespace() -> String {
    "attendance".to_string()
}

fn default_ttl_secs() -> u64 {
    600
}

fn default_local_capacity() -> usize {
    10_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            default_ttl_secs: default_ttl_secs(),
            local_capacity: default_local_capacity(),
            ttl_overrides: HashMap::new(),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.namespace.is_empty() {
            return Err("cache.namespace must not be empty".into());
        }
        if self.namespace.contains(':') || self.namespace.contains('*') {
            return Err("cache.namespace must not contain ':' or '*'".into());
        }
        if self.default_ttl_secs == 0 {
            return Err("cache.default_ttl_secs must be > 0".into());
        }
        if self.local_capacity == 0 {
            return Err("cache.local_capacity must be > 0".into());
        }
        for (name, ttl) in &self.ttl_overrides {
            if CacheCategory::parse(name).is_err() {
                return Err(format!("cache.ttl_overrides: unknown category '{name}'"));
            }
            if *ttl == 0 {
                return Err(format!("cache.ttl_overrides.{name} must be > 0"));
            }
        }
        Ok(())
    }

    /// Build the resolved TTL table from defaults plus overrides.
    pub fn ttl_policy(&self) -> Result<TtlPolicy> {
        let mut policy = TtlPolicy::new(self.default_ttl_secs);
        for (name, ttl) in &self.ttl_overrides {
            policy = policy.with_override(CacheCategory::parse(name)?, *ttl);
        }
        Ok(policy)
    }

    /// Key builder for this namespace.
    pub fn key_builder(&self) -> attendance_cache_core::KeyBuilder {
        attendance_cache_core::KeyBuilder::new(self.namespace.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(CacheConfig::default().validate().is_ok());
        assert!(RedisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_namespace_validation() {
        let config = CacheConfig {
            namespace: "bad:ns".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_override_category_rejected() {
        let mut config = CacheConfig::default();
        config.ttl_overrides.insert("payroll".into(), 60);
        assert!(config.validate().is_err());
        assert!(config.ttl_policy().is_err());
    }

    #[test]
    fn test_ttl_policy_applies_overrides() {
        let mut config = CacheConfig::default();
        config.ttl_overrides.insert("attendance_record".into(), 60);
        let policy = config.ttl_policy().unwrap();
        assert_eq!(policy.ttl_for(CacheCategory::AttendanceRecord), 60);
        assert_eq!(policy.ttl_for(CacheCategory::CalendarData), 86400);
    }

    #[test]
    fn test_redis_url_validation() {
        let config = RedisConfig {
            url: "http://localhost".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
