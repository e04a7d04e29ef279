//! Cache key derivation
//!
//! Key layout: `<repository>@<method>-<digest>` where the digest is the first
//! 128 bits of SHA-256 over the serialized arguments, the serialized active
//! criteria and the request URL.

use super::request::RequestContext;
use crate::traits::{Criterion, CriterionError, CriterionRepr};
use crate::RepositoryError;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;

const DIGEST_BYTES: usize = 16;

/// Contribution of one criterion to a key
///
/// `NotSerializable` is recovered with the type descriptor fallback; any other
/// failure is returned.
pub fn serialize_criterion(criterion: &dyn Criterion) -> Result<CriterionRepr, CriterionError> {
    match criterion.canonical() {
        Ok(value) => Ok(CriterionRepr::Serialized(value)),
        Err(CriterionError::NotSerializable(_)) => Ok(CriterionRepr::opaque(
            criterion.type_name(),
            criterion.properties(),
        )),
        Err(e) => Err(e),
    }
}

/// Canonical JSON of the active criteria, in push order
pub fn serialize_criteria(criteria: &[Arc<dyn Criterion>]) -> Result<String, CriterionError> {
    let direct: Result<Vec<Value>, CriterionError> =
        criteria.iter().map(|criterion| criterion.canonical()).collect();

    match direct {
        Ok(values) => Ok(serde_json::to_string(&values)?),
        Err(CriterionError::NotSerializable(_)) => {
            let reprs = criteria
                .iter()
                .map(|criterion| serialize_criterion(criterion.as_ref()))
                .collect::<Result<Vec<CriterionRepr>, CriterionError>>()?;
            Ok(serde_json::to_string(&reprs)?)
        }
        Err(e) => Err(e),
    }
}

/// Canonical JSON of call arguments
///
/// Going through `Value` sorts object keys, so structurally equal arguments
/// serialize identically.
pub fn serialize_args<A: Serialize + ?Sized>(args: &A) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(args)?;
    serde_json::to_string(&value)
}

/// Derive the key of one call
pub fn derive_key<A: Serialize + ?Sized>(
    repository: &str,
    method: &str,
    args: &A,
    criteria: &[Arc<dyn Criterion>],
    request: &RequestContext,
) -> Result<String, RepositoryError> {
    let args = serialize_args(args)?;
    let criteria = serialize_criteria(criteria)?;

    let mut hasher = Sha256::new();
    hasher.update(args.as_bytes());
    hasher.update(criteria.as_bytes());
    hasher.update(request.full_url().as_bytes());
    let digest = hasher.finalize();

    Ok(format!(
        "{}@{}-{}",
        repository,
        method,
        hex::encode(&digest[..DIGEST_BYTES])
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{ClosureCriterion, FilterCriterion, OrderCriterion};
    use crate::query_builder::{QueryBuilder, QueryFilter, SortOrder};
    use serde_json::json;

    fn request() -> RequestContext {
        RequestContext::new("https://api.test/users?page=1")
    }

    fn adults() -> Arc<dyn Criterion> {
        Arc::new(ClosureCriterion::new("adults", |q| {
            q.filter(QueryFilter::gte("age", json!(18)))
        }))
    }

    /// Fails with something other than NotSerializable
    #[derive(Debug)]
    struct BrokenCriterion;

    impl Criterion for BrokenCriterion {
        fn apply(&self, query: QueryBuilder) -> QueryBuilder {
            query
        }

        fn canonical(&self) -> Result<Value, CriterionError> {
            Err(serde_json::from_str::<Value>("{").unwrap_err().into())
        }
    }

    #[test]
    fn test_key_format() {
        let key = derive_key("Users", "find", &(42,), &[], &request()).unwrap();

        let (prefix, digest) = key.split_once('-').unwrap();
        assert_eq!(prefix, "Users@find");
        assert_eq!(digest.len(), 32);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_is_deterministic() {
        let criteria = vec![adults(), Arc::new(OrderCriterion::new("name", SortOrder::Asc)) as _];

        let first = derive_key("Users", "all", &json!({"b": 1, "a": [1, 2]}), &criteria, &request());
        let second = derive_key("Users", "all", &json!({"a": [1, 2], "b": 1}), &criteria, &request());
        assert_eq!(first.unwrap(), second.unwrap());
    }

    #[test]
    fn test_key_is_sensitive_to_every_input() {
        let base = derive_key("Users", "find", &(42,), &[], &request()).unwrap();

        let other_method = derive_key("Users", "find_where", &(42,), &[], &request()).unwrap();
        let other_args = derive_key("Users", "find", &(43,), &[], &request()).unwrap();
        let other_url = derive_key(
            "Users",
            "find",
            &(42,),
            &[],
            &RequestContext::new("https://api.test/users?page=2"),
        )
        .unwrap();
        let criteria: Vec<Arc<dyn Criterion>> =
            vec![Arc::new(FilterCriterion::single(QueryFilter::eq("active", json!(true))))];
        let other_criteria = derive_key("Users", "find", &(42,), &criteria, &request()).unwrap();
        let other_repository = derive_key("Posts", "find", &(42,), &[], &request()).unwrap();

        for key in [other_method, other_args, other_url, other_criteria, other_repository] {
            assert_ne!(key, base);
        }
    }

    #[test]
    fn test_closure_criterion_falls_back_to_descriptor() {
        let repr = serialize_criterion(adults().as_ref()).unwrap();
        let again = serialize_criterion(adults().as_ref()).unwrap();

        match &repr {
            CriterionRepr::Opaque { hash, properties } => {
                assert_eq!(hash.len(), 64);
                assert_eq!(properties[0].name, "label");
            }
            CriterionRepr::Serialized(_) => panic!("closure criterion should not serialize"),
        }
        assert_eq!(repr, again);
    }

    #[test]
    fn test_mixed_criteria_keep_serializable_members_verbatim() {
        let order: Arc<dyn Criterion> = Arc::new(OrderCriterion::new("name", SortOrder::Desc));
        let json = serialize_criteria(&[order.clone(), adults()]).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed[0], order.canonical().unwrap());
        assert!(parsed[1].get("hash").is_some());
        assert!(parsed[1].get("properties").is_some());
    }

    #[test]
    fn test_closure_labels_distinguish_keys() {
        let minors: Arc<dyn Criterion> = Arc::new(ClosureCriterion::new("minors", |q| {
            q.filter(QueryFilter::lt("age", json!(18)))
        }));

        let a = derive_key("Users", "all", &(), &[adults()], &request()).unwrap();
        let b = derive_key("Users", "all", &(), &[minors], &request()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_other_serialization_failures_propagate() {
        let criteria: Vec<Arc<dyn Criterion>> = vec![Arc::new(BrokenCriterion)];
        assert!(matches!(
            serialize_criteria(&criteria),
            Err(CriterionError::Serialization(_))
        ));

        // Also when another criterion already forced the fallback path
        let criteria: Vec<Arc<dyn Criterion>> = vec![adults(), Arc::new(BrokenCriterion)];
        assert!(matches!(
            derive_key("Users", "all", &(), &criteria, &request()),
            Err(RepositoryError::CriterionError(CriterionError::Serialization(_)))
        ));
    }
}
