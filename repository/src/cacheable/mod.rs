//! Caching layer over any `Repository`
//!
//! - `request`: the request a repository call is made for
//! - `policy`: which calls may be cached and for how long
//! - `key`: deterministic cache keys for calls
//! - `repository`: the `CachedRepository` decorator

pub mod key;
pub mod policy;
pub mod repository;
pub mod request;

pub use key::{derive_key, serialize_args, serialize_criteria, serialize_criterion};
pub use policy::{CachePolicy, CleanAction, DEFAULT_MINUTES};
pub use repository::CachedRepository;
pub use request::RequestContext;
