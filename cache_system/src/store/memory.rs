//! In-memory cache store using moka

use crate::errors::CacheError;
use crate::store::CacheStore;
use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use std::time::Duration;

/// Entry stored in moka
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Serialized JSON value
    data: String,
    /// Expiration timestamp (millis since epoch)
    expires_at: i64,
}

/// Thread-safe in-memory store with per-entry TTL
///
/// Capacity-based eviction is left to moka; expiry is checked on read.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    cache: MokaCache<String, CacheEntry>,
}

impl MemoryStore {
    /// Creates a store holding at most `max_capacity` entries
    pub fn new(max_capacity: u64) -> Self {
        Self {
            cache: MokaCache::builder().max_capacity(max_capacity).build(),
        }
    }

    fn now_millis() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn is_expired(entry: &CacheEntry) -> bool {
        Self::now_millis() >= entry.expires_at
    }

    /// Approximate number of live entries
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self.cache.get(key).await {
            Some(entry) if Self::is_expired(&entry) => {
                self.cache.remove(key).await;
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.data)),
            None => Ok(None),
        }
    }

    async fn put_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let ttl_millis = i64::try_from(ttl.as_millis())
            .map_err(|_| CacheError::InvalidTtl(ttl.as_secs()))?;
        let entry = CacheEntry {
            data: value.to_string(),
            expires_at: Self::now_millis().saturating_add(ttl_millis),
        };

        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn forget(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.cache.remove(key).await.is_some())
    }

    async fn flush(&self) -> Result<(), CacheError> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get() {
        let store = MemoryStore::default();
        store
            .put_raw("users@find-abc", "{\"id\":1}", Duration::from_secs(60))
            .await
            .unwrap();

        let value = store.get_raw("users@find-abc").await.unwrap();
        assert_eq!(value.as_deref(), Some("{\"id\":1}"));
        assert!(store.has("users@find-abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        let store = MemoryStore::default();
        store
            .put_raw("short", "1", Duration::from_millis(0))
            .await
            .unwrap();

        assert!(store.get_raw("short").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_forget_and_flush() {
        let store = MemoryStore::default();
        store.put_raw("a", "1", Duration::from_secs(60)).await.unwrap();
        store.put_raw("b", "2", Duration::from_secs(60)).await.unwrap();

        assert!(store.forget("a").await.unwrap());
        assert!(!store.forget("a").await.unwrap());

        store.flush().await.unwrap();
        assert!(store.get_raw("b").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }
}
