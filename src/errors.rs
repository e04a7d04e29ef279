//! Error types for the repocache crate
//!
//! This module contains the errors returned by the `RepoCache` coordinator.

use cache_system::CacheError;
use config::ConfigError;
use repository::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepoCacheError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),

    #[error("Repository already registered: {0}")]
    RepositoryAlreadyRegistered(String),
}
