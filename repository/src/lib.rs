//! Repository - repository abstraction and its caching decorator
//!
//! This crate provides the `Repository` traits, the criteria applied to
//! repositories, an in-memory repository, and the `cacheable` layer that
//! memoizes repository reads through `cache_system`.

pub mod cacheable;
pub mod criteria;
pub mod errors;
pub mod memory_store;
pub mod prelude;
pub mod query_builder;
pub mod traits;

pub use cache_system::CacheParams;
pub use cacheable::{CachePolicy, CachedRepository, CleanAction, RequestContext};
pub use criteria::{ClosureCriterion, FilterCriterion, LimitCriterion, OrderCriterion};
pub use errors::RepositoryError;
pub use memory_store::MemoryRepository;
pub use query_builder::{Page, Pagination, QueryBuilder, QueryFilter, QueryOperator, SortOrder};
pub use traits::*;
