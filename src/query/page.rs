//! Page parameters and page results.

use serde::Serialize;

use crate::config::MAX_COUNT_PER_PAGE;
use crate::errors::{AppError, AppResult};

/// Validated paging parameters (1-indexed page).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    page: u64,
    count_per_page: u64,
}

impl PageSpec {
    /// Reject non-positive values and oversized pages before any query runs.
    pub fn new(page: i64, count_per_page: i64) -> AppResult<Self> {
        if page < 1 || count_per_page < 1 {
            return Err(AppError::invalid_page(format!(
                "Invalid page ({}) or countPerPage ({}): both must be at least 1",
                page, count_per_page
            )));
        }

        // Both values are positive past this point
        let (page, count_per_page) = (page as u64, count_per_page as u64);
        if count_per_page > MAX_COUNT_PER_PAGE {
            return Err(AppError::invalid_page(format!(
                "countPerPage ({}) exceeds the maximum of {}",
                count_per_page, MAX_COUNT_PER_PAGE
            )));
        }

        Ok(Self {
            page,
            count_per_page,
        })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn count_per_page(&self) -> u64 {
        self.count_per_page
    }

    /// Number of items before the requested page
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.count_per_page
    }

    /// Total pages for `total_count`, failing when the requested page lies beyond it.
    pub fn check(&self, total_count: u64) -> AppResult<u64> {
        let total_pages = total_pages(total_count, self.count_per_page);
        if self.page > total_pages {
            return Err(AppError::page_out_of_range(self.page, total_pages));
        }
        Ok(total_pages)
    }
}

/// Ceiling division; an empty collection still has one (empty) page.
pub fn total_pages(total_count: u64, count_per_page: u64) -> u64 {
    if total_count == 0 || count_per_page == 0 {
        return 1;
    }
    total_count.div_ceil(count_per_page)
}

/// One page of results with the size of the whole filtered collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            total_pages: self.total_pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
