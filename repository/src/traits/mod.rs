//! Traits for repository operations
//!
//! This module contains the traits that define the interface of a repository
//! and of the criteria applied to it.

pub mod core;
pub mod criterion;

// Re-export all public items for convenience
pub use core::{Repository, RepositoryWriter};
pub use criterion::{Criterion, CriterionError, CriterionRepr, PropertyDescriptor};
