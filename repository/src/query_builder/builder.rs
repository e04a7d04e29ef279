//! Query builder utilities
//!
//! Criteria shape a `QueryBuilder`; repositories execute it.

use crate::query_builder::filter::{compare_values, QueryFilter};
use crate::query_builder::ordering::SortOrder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// Query builder for constructing repository queries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryBuilder {
    pub(crate) conditions: Vec<QueryFilter>,
    pub(crate) order_by: Vec<(String, SortOrder)>,
    pub(crate) limit: Option<usize>,
    pub(crate) offset: Option<usize>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter condition
    pub fn filter(mut self, filter: QueryFilter) -> Self {
        self.conditions.push(filter);
        self
    }

    /// Add multiple filters (combined with AND)
    pub fn filters(mut self, filters: Vec<QueryFilter>) -> Self {
        self.conditions.extend(filters);
        self
    }

    /// Add ordering
    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.order_by.push((field.to_string(), order));
        self
    }

    /// Add limit
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Add offset
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn conditions(&self) -> &[QueryFilter] {
        &self.conditions
    }

    /// Whether a document satisfies every condition
    pub fn matches(&self, record: &Value) -> bool {
        self.conditions.iter().all(|filter| filter.matches(record))
    }

    fn compare(&self, left: &Value, right: &Value) -> Ordering {
        for (field, order) in &self.order_by {
            let a = left.get(field).unwrap_or(&Value::Null);
            let b = right.get(field).unwrap_or(&Value::Null);
            let ordering = order.apply(compare_values(a, b).unwrap_or(Ordering::Equal));
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Filter, order and window rows given as (document, item) pairs
    pub fn execute<T>(&self, rows: Vec<(Value, T)>) -> Vec<T> {
        let mut selected: Vec<(Value, T)> = rows
            .into_iter()
            .filter(|(document, _)| self.matches(document))
            .collect();

        if !self.order_by.is_empty() {
            // Stable sort keeps insertion order for ties
            selected.sort_by(|(a, _), (b, _)| self.compare(a, b));
        }

        selected
            .into_iter()
            .skip(self.offset.unwrap_or(0))
            .take(self.limit.unwrap_or(usize::MAX))
            .map(|(_, item)| item)
            .collect()
    }
}
