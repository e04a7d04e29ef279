use cache_system::CacheError;
use thiserror::Error;

use crate::traits::CriterionError;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Criterion error: {0}")]
    CriterionError(#[from] CriterionError),

    #[error("Cache error: {0}")]
    CacheError(#[from] CacheError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl RepositoryError {
    pub fn not_found(repository: &str, id: impl std::fmt::Debug) -> Self {
        Self::NotFound(format!("{} record {:?}", repository, id))
    }
}
