//! Shared response envelope types for API handlers.

use serde::Serialize;
use studysync_core::task_query::{total_pages, TaskFilter};

/// Paging metadata returned alongside every task listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl PageMeta {
    pub fn new(filter: &TaskFilter, total: i64) -> Self {
        Self {
            page: filter.page,
            limit: filter.limit,
            total,
            pages: total_pages(total, filter.limit),
        }
    }
}

/// `{ "data": [...], "meta": {...} }` envelope for paged listings.
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}
