//! Cache store abstraction
//!
//! A store keeps serialized JSON payloads under string keys with a per-entry TTL.
//! Typed access and get-or-compute semantics live in [`crate::CacheManager`].

pub mod memory;
pub mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use crate::errors::CacheError;
use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

/// Key/value store with TTL support, shared by every cached repository
///
/// Implementations must be safe for concurrent use; the repository layer adds no
/// locking of its own.
#[async_trait]
pub trait CacheStore: Send + Sync + Debug {
    /// Gets a raw JSON payload, `None` when absent or expired
    async fn get_raw(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores a raw JSON payload for `ttl`
    async fn put_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Removes a key, returning whether it existed
    async fn forget(&self, key: &str) -> Result<bool, CacheError>;

    /// Removes every key owned by this store
    async fn flush(&self) -> Result<(), CacheError>;

    /// Checks if a live entry exists
    async fn has(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get_raw(key).await?.is_some())
    }
}
