//! Pagination
//!
//! This module provides page arithmetic and the serializable page of results
//! returned by `paginate`.

use serde::{Deserialize, Serialize};

/// Default page size when the caller does not pass one
pub const DEFAULT_PER_PAGE: u32 = 15;

/// Requested page window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub per_page: u32,
    pub page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, 1)
    }
}

impl Pagination {
    /// Pages are 1-based; page 0 is read as page 1 and a zero size as the default
    pub fn new(per_page: Option<u32>, page: u32) -> Self {
        Self {
            per_page: per_page.filter(|n| *n > 0).unwrap_or(DEFAULT_PER_PAGE),
            page: page.max(1),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.per_page as usize
    }

    pub fn last_page(&self, total: usize) -> u32 {
        let pages = total.div_ceil(self.per_page as usize);
        u32::try_from(pages.max(1)).unwrap_or(u32::MAX)
    }
}

/// A page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub per_page: u32,
    pub current_page: u32,
    pub last_page: u32,
}

impl<T> Page<T> {
    /// Cut the page described by `pagination` out of the full result set
    pub fn from_items(items: Vec<T>, pagination: Pagination) -> Self {
        let total = items.len();
        let data = items
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.per_page as usize)
            .collect();

        Self {
            data,
            total,
            per_page: pagination.per_page,
            current_page: pagination.page,
            last_page: pagination.last_page(total),
        }
    }

    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page
    }
}
