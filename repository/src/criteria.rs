//! Stock criteria
//!
//! Data-only criteria serialize themselves; `ClosureCriterion` wraps arbitrary
//! behaviour and therefore falls back to its type descriptor in cache keys.

use crate::query_builder::{QueryBuilder, QueryFilter, SortOrder};
use crate::traits::{Criterion, CriterionError, PropertyDescriptor};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Restrict results with filters (AND)
#[derive(Debug, Clone)]
pub struct FilterCriterion {
    filters: Vec<QueryFilter>,
}

impl FilterCriterion {
    pub fn new(filters: Vec<QueryFilter>) -> Self {
        Self { filters }
    }

    pub fn single(filter: QueryFilter) -> Self {
        Self::new(vec![filter])
    }
}

impl Criterion for FilterCriterion {
    fn apply(&self, query: QueryBuilder) -> QueryBuilder {
        query.filters(self.filters.clone())
    }

    fn canonical(&self) -> Result<Value, CriterionError> {
        Ok(serde_json::json!({
            "criterion": self.type_name(),
            "filters": serde_json::to_value(&self.filters)?,
        }))
    }
}

/// Order results by a field
#[derive(Debug, Clone)]
pub struct OrderCriterion {
    field: String,
    order: SortOrder,
}

impl OrderCriterion {
    pub fn new(field: &str, order: SortOrder) -> Self {
        Self {
            field: field.to_string(),
            order,
        }
    }
}

impl Criterion for OrderCriterion {
    fn apply(&self, query: QueryBuilder) -> QueryBuilder {
        query.order_by(&self.field, self.order.clone())
    }

    fn canonical(&self) -> Result<Value, CriterionError> {
        Ok(serde_json::json!({
            "criterion": self.type_name(),
            "field": self.field,
            "order": serde_json::to_value(&self.order)?,
        }))
    }
}

/// Window results
#[derive(Debug, Clone)]
pub struct LimitCriterion {
    limit: usize,
    offset: usize,
}

impl LimitCriterion {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }
}

impl Criterion for LimitCriterion {
    fn apply(&self, query: QueryBuilder) -> QueryBuilder {
        query.offset(self.offset).limit(self.limit)
    }

    fn canonical(&self) -> Result<Value, CriterionError> {
        Ok(serde_json::json!({
            "criterion": self.type_name(),
            "limit": self.limit,
            "offset": self.offset,
        }))
    }
}

type QueryFn = dyn Fn(QueryBuilder) -> QueryBuilder + Send + Sync;

/// Criterion defined by a closure
///
/// Two instances built from different closures share a cache descriptor, so the
/// `label` should distinguish closures that select different data.
#[derive(Clone)]
pub struct ClosureCriterion {
    label: String,
    callback: Arc<QueryFn>,
}

impl ClosureCriterion {
    pub fn new<F>(label: &str, callback: F) -> Self
    where
        F: Fn(QueryBuilder) -> QueryBuilder + Send + Sync + 'static,
    {
        Self {
            label: label.to_string(),
            callback: Arc::new(callback),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for ClosureCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureCriterion")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl Criterion for ClosureCriterion {
    fn apply(&self, query: QueryBuilder) -> QueryBuilder {
        (self.callback)(query)
    }

    fn canonical(&self) -> Result<Value, CriterionError> {
        Err(CriterionError::NotSerializable(format!(
            "{}({})",
            self.type_name(),
            self.label
        )))
    }

    fn properties(&self) -> Vec<PropertyDescriptor> {
        vec![
            PropertyDescriptor::of::<String>("label").with_value(Value::String(self.label.clone())),
            PropertyDescriptor::of::<QueryFn>("callback"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_criterion_applies_and_serializes() {
        let criterion = FilterCriterion::single(QueryFilter::eq("active", json!(true)));
        let query = criterion.apply(QueryBuilder::new());

        assert_eq!(query.conditions().len(), 1);
        let value = criterion.canonical().unwrap();
        assert_eq!(
            value["filters"][0],
            serde_json::to_value(QueryFilter::eq("active", json!(true))).unwrap()
        );
    }

    #[test]
    fn test_different_criteria_serialize_differently() {
        let asc = OrderCriterion::new("name", SortOrder::Asc).canonical().unwrap();
        let desc = OrderCriterion::new("name", SortOrder::Desc).canonical().unwrap();
        assert_ne!(asc, desc);
    }

    #[test]
    fn test_closure_criterion_is_not_serializable() {
        let criterion = ClosureCriterion::new("adults", |q| {
            q.filter(QueryFilter::gte("age", json!(18)))
        });

        assert!(matches!(
            criterion.canonical(),
            Err(CriterionError::NotSerializable(_))
        ));
        assert_eq!(criterion.apply(QueryBuilder::new()).conditions().len(), 1);
        assert_eq!(criterion.properties()[0].value, Some(json!("adults")));
    }
}
