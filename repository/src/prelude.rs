//! Convenience re-exports for common repository usage

// Core traits
pub use crate::traits::{Criterion, Repository, RepositoryWriter};

// Error types
pub use crate::errors::RepositoryError;
pub use crate::traits::CriterionError;

// Caching layer
pub use crate::cacheable::{CachePolicy, CachedRepository, RequestContext};

// Stock criteria
pub use crate::criteria::{ClosureCriterion, FilterCriterion, LimitCriterion, OrderCriterion};

// In-memory repository
pub use crate::memory_store::MemoryRepository;

// Query building
pub use crate::query_builder::{Page, QueryBuilder, QueryFilter, SortOrder};

// Cache params (re-exported from cache_system)
pub use crate::CacheParams;

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
