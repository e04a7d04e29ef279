//! Key registry
//!
//! Records which cache keys each repository produced so that all of them can be
//! forgotten at once when the repository's data changes.

pub mod file;
pub mod memory;

pub use file::FileKeyRegistry;
pub use memory::MemoryKeyRegistry;

use crate::errors::CacheError;
use async_trait::async_trait;
use std::fmt::Debug;

/// Index of cache keys grouped by owning repository
#[async_trait]
pub trait KeyRegistry: Send + Sync + Debug {
    /// Record `key` under `owner`; recording the same key twice is a no-op
    async fn put_key(&self, owner: &str, key: &str) -> Result<(), CacheError>;

    /// Every key recorded for `owner`, in sorted order
    async fn keys(&self, owner: &str) -> Result<Vec<String>, CacheError>;

    /// Drop the index entry of `owner`, returning the keys it held
    async fn forget_owner(&self, owner: &str) -> Result<Vec<String>, CacheError>;
}
