//! Query builder utilities
//!
//! This module provides the filter, ordering and pagination types that read
//! operations and criteria are expressed in.

pub mod builder;
pub mod filter;
pub mod ordering;
pub mod pagination;


pub use builder::QueryBuilder;
pub use filter::{LogicalOperator, QueryCondition, QueryFilter, QueryOperator};
pub use ordering::SortOrder;
pub use pagination::{Page, Pagination, DEFAULT_PER_PAGE};
