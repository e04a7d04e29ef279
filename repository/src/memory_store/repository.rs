//! Repository implementations for the in-memory store

use super::core::MemoryRepository;
use crate::errors::RepositoryError;
use crate::query_builder::{Page, Pagination, QueryFilter};
use crate::traits::{Criterion, Repository, RepositoryWriter};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

#[async_trait]
impl<M, I> Repository for MemoryRepository<M, I>
where
    M: Clone + Send + Sync + Debug + Serialize + DeserializeOwned + 'static,
    I: Clone + Send + Sync + Debug + Serialize + 'static,
{
    type Model = M;
    type Id = I;

    /// Instances over the same model type hold different data, so the name is the identity
    fn repository_name(&self) -> String {
        self.name.clone()
    }

    async fn all(&self, columns: &[String]) -> Result<Vec<M>, RepositoryError> {
        let models = self.select(&self.base_query()).await?;
        self.project(models, columns)
    }

    async fn paginate(
        &self,
        per_page: Option<u32>,
        page: u32,
        columns: &[String],
    ) -> Result<Page<M>, RepositoryError> {
        let models = self.select(&self.base_query()).await?;
        let models = self.project(models, columns)?;
        Ok(Page::from_items(models, Pagination::new(per_page, page)))
    }

    async fn find(&self, id: &I, columns: &[String]) -> Result<M, RepositoryError> {
        let query = self
            .base_query()
            .filter(QueryFilter::eq(&self.id_field, serde_json::to_value(id)?))
            .limit(1);

        let model = self
            .select(&query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::not_found(&self.name, id))?;

        self.project(vec![model], columns)?
            .pop()
            .ok_or_else(|| RepositoryError::not_found(&self.name, id))
    }

    async fn find_by_field(
        &self,
        field: &str,
        value: &Value,
        columns: &[String],
    ) -> Result<Vec<M>, RepositoryError> {
        let query = self
            .base_query()
            .filter(QueryFilter::eq(field, value.clone()));
        let models = self.select(&query).await?;
        self.project(models, columns)
    }

    async fn find_where(
        &self,
        filters: &[QueryFilter],
        columns: &[String],
    ) -> Result<Vec<M>, RepositoryError> {
        let query = self.base_query().filters(filters.to_vec());
        let models = self.select(&query).await?;
        self.project(models, columns)
    }

    async fn get_by_criteria(
        &self,
        criterion: Arc<dyn Criterion>,
    ) -> Result<Vec<M>, RepositoryError> {
        let query = criterion.apply(self.base_query());
        self.select(&query).await
    }

    fn criteria(&self) -> &[Arc<dyn Criterion>] {
        &self.criteria
    }

    fn push_criterion(&mut self, criterion: Arc<dyn Criterion>) {
        self.criteria.push(criterion);
    }

    fn reset_criteria(&mut self) {
        self.criteria.clear();
    }

    fn skip_criteria(&mut self, skip: bool) {
        self.skip_criteria = skip;
    }

    fn is_skipping_criteria(&self) -> bool {
        self.skip_criteria
    }
}

#[async_trait]
impl<M, I> RepositoryWriter for MemoryRepository<M, I>
where
    M: Clone + Send + Sync + Debug + Serialize + DeserializeOwned + 'static,
    I: Clone + Send + Sync + Debug + Serialize + 'static,
{
    async fn create(&self, attributes: Value) -> Result<M, RepositoryError> {
        let Value::Object(mut fields) = attributes else {
            return Err(RepositoryError::ValidationError(
                "attributes must be a JSON object".to_string(),
            ));
        };

        let mut records = self.records.write().await;
        if !fields.contains_key(&self.id_field) {
            let id = self.next_id(&records)?;
            fields.insert(self.id_field.clone(), Value::from(id));
        }

        let model: M = serde_json::from_value(Value::Object(fields))?;
        records.push(model.clone());
        Ok(model)
    }

    async fn update(&self, id: &I, attributes: Value) -> Result<M, RepositoryError> {
        let Value::Object(changes) = attributes else {
            return Err(RepositoryError::ValidationError(
                "attributes must be a JSON object".to_string(),
            ));
        };
        let id_value = serde_json::to_value(id)?;

        let mut records = self.records.write().await;
        let mut documents = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, serde_json::Error>>()?;
        let Some(index) = documents
            .iter()
            .position(|document| document.get(&self.id_field) == Some(&id_value))
        else {
            return Err(RepositoryError::not_found(&self.name, id));
        };

        let mut document = documents.swap_remove(index);
        if let Value::Object(fields) = &mut document {
            for (name, value) in changes {
                // The primary key is immutable
                if name != self.id_field {
                    fields.insert(name, value);
                }
            }
        }

        let updated: M = serde_json::from_value(document)?;
        records[index] = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: &I) -> Result<bool, RepositoryError> {
        let id_value = serde_json::to_value(id)?;
        let mut records = self.records.write().await;

        let position = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<Value>, serde_json::Error>>()?
            .iter()
            .position(|document| document.get(&self.id_field) == Some(&id_value));

        match position {
            Some(index) => {
                records.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
