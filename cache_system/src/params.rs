//! Cache parameter bundle
//!
//! This module defines the CacheParams struct handed to every cached repository:
//! the shared manager plus the registry that indexes the keys it produces.

use crate::registry::{KeyRegistry, MemoryKeyRegistry};
use crate::CacheManager;
use std::sync::Arc;

/// Shared cache collaborators injected into a cached repository
#[derive(Debug, Clone)]
pub struct CacheParams {
    /// The cache manager instance
    pub manager: Arc<CacheManager>,
    /// Index of generated keys per repository
    pub registry: Arc<dyn KeyRegistry>,
}

impl CacheParams {
    pub fn new(manager: Arc<CacheManager>, registry: Arc<dyn KeyRegistry>) -> Self {
        Self { manager, registry }
    }

    /// Params with a process-local key registry
    pub fn in_memory(manager: Arc<CacheManager>) -> Self {
        Self::new(manager, Arc::new(MemoryKeyRegistry::new()))
    }
}
