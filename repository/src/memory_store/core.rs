use crate::query_builder::QueryBuilder;
use crate::traits::Criterion;
use crate::RepositoryError;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Repository over an in-process collection of models
///
/// Models are matched through their JSON form, so any serde model works. Column
/// projection drops unlisted fields before decoding, which requires the model to
/// tolerate missing fields (`Option` or `#[serde(default)]`).
///
/// `I` is the id type accepted by `find`, `update` and `delete`.
pub struct MemoryRepository<M, I = i64> {
    pub(crate) name: String,
    pub(crate) id_field: String,
    pub(crate) records: Arc<RwLock<Vec<M>>>,
    pub(crate) criteria: Vec<Arc<dyn Criterion>>,
    pub(crate) skip_criteria: bool,
    pub(crate) _phantom: PhantomData<fn() -> I>,
}

impl<M, I> Clone for MemoryRepository<M, I> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            id_field: self.id_field.clone(),
            records: Arc::clone(&self.records),
            criteria: self.criteria.clone(),
            skip_criteria: self.skip_criteria,
            _phantom: PhantomData,
        }
    }
}

impl<M, I> std::fmt::Debug for MemoryRepository<M, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRepository")
            .field("name", &self.name)
            .field("id_field", &self.id_field)
            .field("criteria", &self.criteria)
            .field("skip_criteria", &self.skip_criteria)
            .finish()
    }
}

impl<M, I> MemoryRepository<M, I>
where
    M: Clone + Serialize + DeserializeOwned,
{
    pub fn new(name: &str, records: Vec<M>) -> Self {
        Self {
            name: name.to_string(),
            id_field: "id".to_string(),
            records: Arc::new(RwLock::new(records)),
            criteria: Vec::new(),
            skip_criteria: false,
            _phantom: PhantomData,
        }
    }

    /// Use a primary key field other than `id`
    pub fn with_id_field(mut self, id_field: &str) -> Self {
        self.id_field = id_field.to_string();
        self
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Query with the active criteria applied
    pub(crate) fn base_query(&self) -> QueryBuilder {
        if self.skip_criteria {
            return QueryBuilder::new();
        }
        self.criteria
            .iter()
            .fold(QueryBuilder::new(), |query, criterion| criterion.apply(query))
    }

    /// Run `query` over a snapshot of the records
    pub(crate) async fn select(&self, query: &QueryBuilder) -> Result<Vec<M>, RepositoryError> {
        let records = self.records.read().await;
        let rows = records
            .iter()
            .map(|record| Ok((serde_json::to_value(record)?, record.clone())))
            .collect::<Result<Vec<(Value, M)>, serde_json::Error>>()?;
        Ok(query.execute(rows))
    }

    /// Keep only `columns` (plus the id field); empty means every column
    pub(crate) fn project(
        &self,
        models: Vec<M>,
        columns: &[String],
    ) -> Result<Vec<M>, RepositoryError> {
        if columns.is_empty() || columns.iter().any(|c| c == "*") {
            return Ok(models);
        }

        models
            .into_iter()
            .map(|model| {
                let mut document = serde_json::to_value(&model)?;
                if let Value::Object(fields) = &mut document {
                    fields.retain(|name, _| name == &self.id_field || columns.contains(name));
                }
                Ok(serde_json::from_value(document)?)
            })
            .collect()
    }

    /// Next integer id for records created without one
    pub(crate) fn next_id(&self, records: &[M]) -> Result<i64, RepositoryError> {
        let mut max = 0;
        for record in records {
            let document = serde_json::to_value(record)?;
            if let Some(id) = document.get(&self.id_field).and_then(Value::as_i64) {
                max = max.max(id);
            }
        }
        Ok(max + 1)
    }
}
