//! Trait definitions
//!
//! This module defines the read and write interfaces of a repository.

use crate::query_builder::{Page, QueryFilter};
use crate::traits::Criterion;
use crate::RepositoryError;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// Read operations every repository exposes
///
/// `columns` narrows the returned documents to the listed fields; an empty slice
/// means every field.
#[async_trait]
pub trait Repository: Send + Sync {
    /// The model type that this repository returns
    type Model: Clone + Send + Sync + Debug + Serialize + DeserializeOwned + 'static;

    /// The ID type used to look models up
    type Id: Clone + Send + Sync + Debug + Serialize + 'static;

    /// Identity of the concrete repository type, used to namespace cache keys
    fn repository_name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    /// List every model
    async fn all(&self, columns: &[String]) -> Result<Vec<Self::Model>, RepositoryError>;

    /// One page of models; `per_page = None` uses the default page size
    async fn paginate(
        &self,
        per_page: Option<u32>,
        page: u32,
        columns: &[String],
    ) -> Result<Page<Self::Model>, RepositoryError>;

    /// Model by ID, `RepositoryError::NotFound` when absent
    async fn find(&self, id: &Self::Id, columns: &[String])
        -> Result<Self::Model, RepositoryError>;

    /// Models whose `field` equals `value`
    async fn find_by_field(
        &self,
        field: &str,
        value: &Value,
        columns: &[String],
    ) -> Result<Vec<Self::Model>, RepositoryError>;

    /// Models matching every filter
    async fn find_where(
        &self,
        filters: &[QueryFilter],
        columns: &[String],
    ) -> Result<Vec<Self::Model>, RepositoryError>;

    /// Models selected by a one-off criterion, on top of the active criteria
    async fn get_by_criteria(
        &self,
        criterion: Arc<dyn Criterion>,
    ) -> Result<Vec<Self::Model>, RepositoryError>;

    /// Criteria applied to every read, in push order
    fn criteria(&self) -> &[Arc<dyn Criterion>];

    fn push_criterion(&mut self, criterion: Arc<dyn Criterion>);

    fn reset_criteria(&mut self);

    /// Temporarily ignore the active criteria without dropping them
    fn skip_criteria(&mut self, skip: bool);

    /// Whether reads currently ignore the active criteria
    fn is_skipping_criteria(&self) -> bool {
        false
    }
}

/// Write operations
#[async_trait]
pub trait RepositoryWriter: Repository {
    async fn create(&self, attributes: Value) -> Result<Self::Model, RepositoryError>;

    async fn update(&self, id: &Self::Id, attributes: Value)
        -> Result<Self::Model, RepositoryError>;

    /// Returns whether a model was deleted
    async fn delete(&self, id: &Self::Id) -> Result<bool, RepositoryError>;
}
