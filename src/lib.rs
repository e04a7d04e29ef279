//! # repocache
//!
//! A caching decorator for repositories. Reads (`all`, `paginate`, `find`,
//! `find_by_field`, `find_where`, `get_by_criteria`) are memoized in a cache
//! store under keys derived from the repository, the method, its arguments, the
//! active criteria and the request URL; writes clean the repository's keys.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use repocache::prelude::*;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     pub id: i64,
//!     pub name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repocache = RepoCache::new(AppConfig::default())?;
//!
//!     let users = MemoryRepository::<User>::new(
//!         "users",
//!         vec![User { id: 42, name: "Ada".to_string() }],
//!     );
//!     let users = repocache
//!         .cached(users)
//!         .with_request(RequestContext::from_url("https://api.example.com/users/42"));
//!
//!     // First call reads the repository, the second one the cache
//!     let first = users.find(&42, &[]).await?;
//!     let second = users.find(&42, &[]).await?;
//!     assert_eq!(first.name, second.name);
//!
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod errors;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::RepoCache;
pub use errors::RepoCacheError;

// Re-export centralized config
pub use config::{AllowedMethods, AppConfig, CacheConfig};

// Re-export internal crates used by the public API
pub use cache_system;
pub use repository;

// Re-export external dependencies used in public API
pub use async_trait;
