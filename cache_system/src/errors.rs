//! Error types for cache operations
//!
//! This module defines all error types that can occur
//! during cache operations, store resolution and key registry access.

use thiserror::Error;

/// Cache system errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    ConnectionError(#[from] redis::RedisError),

    #[error("Connection pool error: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Unknown cache store: {0}")]
    UnknownStore(String),

    #[error("Invalid TTL value: {0}")]
    InvalidTtl(u64),

    #[error("Key registry error: {0}")]
    Registry(#[from] std::io::Error),

    #[error("Invalid cache configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("General cache error: {0}")]
    General(String),
}
