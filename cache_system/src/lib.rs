//! Cache system for the cacheable repository layer
//!
//! This crate provides the cache stores (in-memory and Redis), the manager that
//! resolves a store from configuration and memoizes computed values, and the key
//! registry used to invalidate every key a repository has produced.

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        $crate::tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        $crate::tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod errors;
pub mod manager;
pub mod params;
pub mod prelude;
pub mod registry;
pub mod store;

// Re-export centralized config
pub use config::CacheConfig;

pub use errors::CacheError;
pub use manager::CacheManager;
pub use params::CacheParams;
pub use registry::{FileKeyRegistry, KeyRegistry, MemoryKeyRegistry};
pub use store::{CacheStore, MemoryStore, RedisStore};

#[doc(hidden)]
pub use tracing;
