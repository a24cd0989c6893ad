//! Pagination arithmetic and the paged response envelope.
//!
//! Pure functions over `(page, limit, total)`. A page beyond the last one is
//! legal: the window is computed as usual, the store returns no rows, and
//! `total`/`totalPages` still reflect the true counts. Nothing here clamps
//! the requested page.

use serde::Serialize;

/// The `(skip, take)` pair selecting one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: u64,
    pub take: u64,
}

impl PageWindow {
    /// `skip = (page - 1) * limit`, `take = limit`. Expects `page >= 1`.
    pub fn of(page: u32, limit: u32) -> Self {
        Self {
            skip: u64::from(page.saturating_sub(1)) * u64::from(limit),
            take: u64::from(limit),
        }
    }
}

/// Number of pages needed for `total` rows; 0 when `total` is 0.
pub fn total_pages(total: u64, limit: u32) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(u64::from(limit))
}

/// Pagination metadata echoed back with every listing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: total_pages(total, limit),
        }
    }
}

/// One page of results: `{ data, pagination }`.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}
