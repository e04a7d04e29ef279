//! Cache manager implementation
//!
//! This module provides the main CacheManager struct: it resolves the configured
//! store and offers typed get/put plus get-or-compute (`remember`) on top of it.

use crate::errors::CacheError;
use crate::store::{CacheStore, MemoryStore, RedisStore};
use crate::{debug_log, trace_log};
use config::CacheConfig;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Cache manager shared by every cached repository
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn CacheStore>,
    config: Arc<CacheConfig>,
}

impl Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("store", &self.store)
            .field("repository", &self.config.repository)
            .field("minutes", &self.config.minutes)
            .finish()
    }
}

impl CacheManager {
    /// Resolve the store named by `config.repository`
    ///
    /// `"cache"` and `"memory"` select the in-memory store, `"redis"` the Redis
    /// store. Any other selector is a construction-time error.
    pub fn from_config(config: CacheConfig) -> Result<Self, CacheError> {
        config.validate()?;

        let store: Arc<dyn CacheStore> = match config.repository.as_str() {
            "cache" | "memory" => Arc::new(MemoryStore::new(config.memory_capacity)),
            "redis" => {
                let url = config.redis_url.as_deref().ok_or_else(|| {
                    CacheError::Connection("redis_url is not configured".to_string())
                })?;
                Arc::new(RedisStore::new(url, &config.key_prefix)?)
            }
            other => return Err(CacheError::UnknownStore(other.to_string())),
        };

        debug_log!("[CACHE] resolved store '{}'", config.repository);

        Ok(Self {
            store,
            config: Arc::new(config),
        })
    }

    /// Build a manager around an already constructed store
    pub fn with_store(store: Arc<dyn CacheStore>, config: CacheConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    fn ttl_from_minutes(minutes: u64) -> Result<Duration, CacheError> {
        if minutes == 0 {
            return Err(CacheError::InvalidTtl(minutes));
        }
        minutes
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or(CacheError::InvalidTtl(minutes))
    }

    /// Get a typed value from the cache
    pub async fn get<V>(&self, key: &str) -> Result<Option<V>, CacheError>
    where
        V: DeserializeOwned,
    {
        match self.store.get_raw(key).await? {
            Some(json_str) => Ok(Some(serde_json::from_str(&json_str)?)),
            None => Ok(None),
        }
    }

    /// Store a typed value for `minutes`
    pub async fn put<V>(&self, key: &str, value: &V, minutes: u64) -> Result<(), CacheError>
    where
        V: Serialize + ?Sized,
    {
        let ttl = Self::ttl_from_minutes(minutes)?;
        let json_str = serde_json::to_string(value)?;
        self.store.put_raw(key, &json_str, ttl).await
    }

    /// Return the cached value at `key`, or compute, store and return it
    ///
    /// Errors from `compute` are returned as-is and nothing is stored. A payload
    /// that no longer decodes as `V` is treated as a miss and overwritten.
    /// Concurrent misses on the same key may each run `compute`; the last write wins.
    pub async fn remember<V, E, F, Fut>(
        &self,
        key: &str,
        minutes: u64,
        compute: F,
    ) -> Result<V, E>
    where
        V: Serialize + DeserializeOwned + Send,
        E: From<CacheError>,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<V, E>> + Send,
    {
        if let Some(json_str) = self.store.get_raw(key).await? {
            match serde_json::from_str::<V>(&json_str) {
                Ok(value) => {
                    trace_log!("[CACHE] hit {}", key);
                    return Ok(value);
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "discarding undecodable cache entry");
                }
            }
        }

        trace_log!("[CACHE] miss {}", key);
        let value = compute().await?;
        self.put(key, &value, minutes).await?;
        Ok(value)
    }

    /// Delete a key from the store
    pub async fn forget(&self, key: &str) -> Result<bool, CacheError> {
        self.store.forget(key).await
    }

    /// Drop every entry of the underlying store
    pub async fn flush(&self) -> Result<(), CacheError> {
        self.store.flush().await
    }

    /// Check if a live entry exists
    pub async fn has(&self, key: &str) -> Result<bool, CacheError> {
        self.store.has(key).await
    }

    /// Get current configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get the resolved store
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn memory_manager() -> CacheManager {
        CacheManager::from_config(CacheConfig::default()).unwrap()
    }

    #[test]
    fn test_unknown_store_rejected() {
        let err = CacheManager::from_config(CacheConfig::new("memcached", 30)).unwrap_err();
        assert!(matches!(err, CacheError::UnknownStore(name) if name == "memcached"));
    }

    #[test]
    fn test_redis_selector_resolves_lazily() {
        let config = CacheConfig::new("redis", 30).with_redis_url("redis://localhost:6379");
        let manager = CacheManager::from_config(config).unwrap();
        assert!(format!("{:?}", manager).contains("RedisStore"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = CacheManager::from_config(CacheConfig::default().with_minutes(0)).unwrap_err();
        assert!(matches!(err, CacheError::Config(_)));
    }

    #[tokio::test]
    async fn test_remember_computes_once() {
        let manager = memory_manager();
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        for _ in 0..3 {
            let value: Result<Vec<i32>, CacheError> = manager
                .remember("numbers", 30, move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2, 3])
                })
                .await;
            assert_eq!(value.unwrap(), vec![1, 2, 3]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remember_does_not_store_errors() {
        let manager = memory_manager();

        let failed: Result<i32, CacheError> = manager
            .remember("answer", 30, || async { Err(CacheError::General("boom".into())) })
            .await;
        assert!(failed.is_err());
        assert!(!manager.has("answer").await.unwrap());

        let ok: Result<i32, CacheError> = manager.remember("answer", 30, || async { Ok(42) }).await;
        assert_eq!(ok.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_recomputed() {
        let manager = memory_manager();
        manager.put("shape", "not a number", 30).await.unwrap();

        let value: Result<i64, CacheError> = manager.remember("shape", 30, || async { Ok(7) }).await;
        assert_eq!(value.unwrap(), 7);
        assert_eq!(manager.get::<i64>("shape").await.unwrap(), Some(7));
    }

    #[tokio::test]
    async fn test_zero_minutes_rejected_on_put() {
        let manager = memory_manager();
        let err = manager.put("k", &1, 0).await.unwrap_err();
        assert!(matches!(err, CacheError::InvalidTtl(0)));
    }
}
