//! Criterion capability
//!
//! A criterion modifies the query a repository runs. For caching, every criterion
//! must also describe itself canonically: either as a JSON value, or by reporting
//! `NotSerializable` and listing its declared properties so a stable descriptor
//! can stand in for it.

use crate::query_builder::QueryBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CriterionError {
    /// The criterion embeds behaviour (a closure) that has no canonical form
    #[error("criterion {0} is not serializable")]
    NotSerializable(String),

    #[error("criterion serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Declared property of a criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    pub type_name: String,
    /// Canonical value, for properties that are plain data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PropertyDescriptor {
    pub fn new(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Descriptor for a field of type `T`
    pub fn of<T: ?Sized>(name: &str) -> Self {
        Self::new(name, std::any::type_name::<T>())
    }
}

/// What a criterion contributes to a cache key
///
/// `Serialized` is emitted as the criterion's own value, so a serializable
/// criterion contributes the same bytes whether or not a sibling criterion
/// needed the fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CriterionRepr {
    Opaque {
        hash: String,
        properties: Vec<PropertyDescriptor>,
    },
    Serialized(Value),
}

impl CriterionRepr {
    /// Fallback descriptor: digest of the structural type plus its declared properties
    pub fn opaque(type_name: &str, properties: Vec<PropertyDescriptor>) -> Self {
        let digest = Sha256::digest(type_name.as_bytes());
        Self::Opaque {
            hash: hex::encode(digest),
            properties,
        }
    }
}

/// Composable query modification applied by a repository
pub trait Criterion: Send + Sync + Debug {
    /// Structural type identity
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Shape the query
    fn apply(&self, query: QueryBuilder) -> QueryBuilder;

    /// Canonical representation, or `CriterionError::NotSerializable`
    fn canonical(&self) -> Result<Value, CriterionError>;

    /// Declared properties, in declaration order
    fn properties(&self) -> Vec<PropertyDescriptor> {
        Vec::new()
    }
}
