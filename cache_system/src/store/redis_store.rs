//! Redis-backed cache store
//!
//! Keys are namespaced with the configured prefix so several applications can
//! share one Redis database.

use crate::errors::CacheError;
use crate::store::CacheStore;
use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Redis-based cache store
#[derive(Clone)]
pub struct RedisStore {
    client: Arc<Client>,
    prefix: String,
    connection_pool: Arc<RwLock<Option<redis::aio::MultiplexedConnection>>>,
}

impl Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let connection_status = match self.connection_pool.try_read() {
            Ok(pool) => {
                if pool.is_some() {
                    "connected"
                } else {
                    "no_connection"
                }
            }
            Err(_) => "lock_error",
        };

        f.debug_struct("RedisStore")
            .field("prefix", &self.prefix)
            .field("connected", &connection_status)
            .finish()
    }
}

impl RedisStore {
    /// Create a new store; the connection is opened lazily on first use
    pub fn new(redis_url: &str, prefix: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;

        Ok(Self {
            client: Arc::new(client),
            prefix: prefix.to_string(),
            connection_pool: Arc::new(RwLock::new(None)),
        })
    }

    /// Get or create Redis connection
    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, CacheError> {
        let mut pool = self.connection_pool.write().await;

        if pool.is_none() {
            let connection = self.client.get_multiplexed_async_connection().await?;
            *pool = Some(connection);
        }

        Ok(pool
            .as_ref()
            .ok_or_else(|| CacheError::Connection("Failed to get connection from pool".into()))?
            .clone())
    }

    fn build_key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    /// Ping Redis to check connectivity
    pub async fn ping(&self) -> Result<String, CacheError> {
        let mut conn = self.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong)
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.get_connection().await?;
        let cached: Option<String> = conn.get(self.build_key(key)).await?;
        Ok(cached)
    }

    async fn put_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let seconds = ttl.as_secs();
        if seconds == 0 {
            return Err(CacheError::InvalidTtl(seconds));
        }

        let mut conn = self.get_connection().await?;
        let _: () = conn.set_ex(self.build_key(key), value, seconds).await?;
        Ok(())
    }

    async fn forget(&self, key: &str) -> Result<bool, CacheError> {
        let mut conn = self.get_connection().await?;
        let deleted: i32 = conn.del(self.build_key(key)).await?;
        Ok(deleted > 0)
    }

    async fn flush(&self) -> Result<(), CacheError> {
        let pattern = format!("{}:*", self.prefix);
        let mut conn = self.get_connection().await?;

        let keys: Vec<String> = conn.keys(&pattern).await?;
        if keys.is_empty() {
            return Ok(());
        }

        let _: i32 = conn.del(keys).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_prefixed() {
        let store = RedisStore::new("redis://localhost:6379", "repocache").unwrap();
        assert_eq!(store.build_key("users@find-abc"), "repocache:users@find-abc");
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(RedisStore::new("not a url", "repocache").is_err());
    }

    #[test]
    fn test_debug_reports_lazy_connection() {
        let store = RedisStore::new("redis://localhost:6379", "repocache").unwrap();
        let rendered = format!("{:?}", store);
        assert!(rendered.contains("no_connection"));
    }
}
