//! Convenience re-exports for common repocache usage
//!
//! This prelude module re-exports the most commonly used items from the
//! workspace, making it easier to import everything you need with a single use
//! statement.
//!
//! # Example
//!
//! ```rust
//! use repocache::prelude::*;
//!
//! // Now you have access to the coordinator, the repository traits and the cache types
//! ```

// Core repocache components
pub use crate::core::RepoCache;
pub use crate::errors::RepoCacheError;

// Re-export centralized config
pub use config::{AllowedMethods, AppConfig, CacheConfig};

// Re-export commonly used repository types for convenience
pub use repository::prelude::*;

// Re-export cache system
pub use cache_system::prelude::*;

// Common external dependencies
pub use anyhow;
pub use tokio;
