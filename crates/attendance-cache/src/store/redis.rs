//! Redis-backed remote store client.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::redis::{AsyncCommands, cmd};
use deadpool_redis::{Connection, Pool, PoolConfig, Runtime};

use attendance_cache_core::{CacheError, Result};

use super::{RemoteStore, StoreStats};
use crate::config::RedisConfig;

/// Number of keys requested per SCAN page during pattern deletion.
const SCAN_PAGE_SIZE: usize = 200;

/// Remote store client over a pooled Redis connection.
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// Wrap an existing pool (e.g. one shared with other subsystems).
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Build a pool from configuration.
    ///
    /// Pool wait/create/recycle timeouts come from `timeout_ms`, so a
    /// remote call against a dead store fails within a bounded interval
    /// instead of hanging.
    pub fn connect(config: &RedisConfig) -> Result<Self> {
        config.validate().map_err(CacheError::configuration)?;

        let mut redis_config = deadpool_redis::Config::from_url(&config.url);
        let mut pool_config = PoolConfig::new(config.pool_size);
        let timeout = Some(Duration::from_millis(config.timeout_ms));
        pool_config.timeouts.wait = timeout;
        pool_config.timeouts.create = timeout;
        pool_config.timeouts.recycle = timeout;
        redis_config.pool = Some(pool_config);

        let pool = redis_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheError::configuration(e.to_string()))?;

        tracing::info!(url = %config.url, pool_size = config.pool_size, "Redis store configured");
        Ok(Self { pool })
    }

    async fn conn(&self) -> Result<Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::store_unavailable(e.to_string()))
    }

    /// Connectivity probe for health checks.
    pub async fn ping(&self) -> bool {
        match self.conn().await {
            Ok(mut conn) => {
                let pong: Result<String> = cmd("PING")
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| CacheError::store_unavailable(e.to_string()));
                pong.is_ok()
            }
            Err(_) => false,
        }
    }
}

#[async_trait]
impl RemoteStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn().await?;
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| CacheError::store_unavailable(e.to_string()))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut conn = self.conn().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e| CacheError::store_unavailable(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<u64> {
        let mut conn = self.conn().await?;
        conn.del::<_, u64>(key)
            .await
            .map_err(|e| CacheError::store_unavailable(e.to_string()))
    }

    async fn delete_by_pattern(&self, pattern: &str) -> Result<u64> {
        let mut conn = self.conn().await?;
        let mut removed = 0u64;
        let mut cursor = 0u64;

        // Cursor SCAN + batched DEL; KEYS would block the server.
        loop {
            let (next, keys): (u64, Vec<String>) = cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_PAGE_SIZE)
                .query_async(&mut conn)
                .await
                .map_err(|e| CacheError::store_unavailable(e.to_string()))?;

            if !keys.is_empty() {
                removed += conn
                    .del::<_, u64>(keys)
                    .await
                    .map_err(|e| CacheError::store_unavailable(e.to_string()))?;
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        tracing::debug!(pattern = %pattern, removed, "pattern delete (remote)");
        Ok(removed)
    }

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<bool> {
        let mut conn = self.conn().await?;
        conn.expire::<_, bool>(key, ttl_secs as i64)
            .await
            .map_err(|e| CacheError::store_unavailable(e.to_string()))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn().await?;
        conn.exists::<_, bool>(key)
            .await
            .map_err(|e| CacheError::store_unavailable(e.to_string()))
    }

    async fn stats(&self) -> Result<StoreStats> {
        let mut conn = self.conn().await?;
        let info: String = cmd("INFO")
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::store_unavailable(e.to_string()))?;
        Ok(parse_info(&info))
    }
}

/// Pull the counters we report from Redis INFO output.
fn parse_info(info: &str) -> StoreStats {
    let field = |name: &str| -> u64 {
        info.lines()
            .find_map(|line| line.strip_prefix(name).and_then(|v| v.strip_prefix(':')))
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    };

    StoreStats {
        hits: field("keyspace_hits"),
        misses: field("keyspace_misses"),
        memory_used_bytes: field("used_memory"),
        connected_clients: field("connected_clients"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info() {
        let info = "# Clients\r\nconnected_clients:3\r\n\
                    # Memory\r\nused_memory:1048576\r\nused_memory_human:1.00M\r\n\
                    # Stats\r\nkeyspace_hits:90\r\nkeyspace_misses:10\r\n";
        let stats = parse_info(info);
        assert_eq!(
            stats,
            StoreStats {
                hits: 90,
                misses: 10,
                memory_used_bytes: 1_048_576,
                connected_clients: 3,
            }
        );
    }

    #[test]
    fn test_parse_info_missing_fields_default_to_zero() {
        let stats = parse_info("# Server\r\nredis_version:7.2.0\r\n");
        assert_eq!(stats, StoreStats::default());
    }
}
