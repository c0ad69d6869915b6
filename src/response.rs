//! Paginated response shape.

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub size: u32,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: u64, page: u32, size: u32) -> Self {
        Page {
            items,
            total_count,
            page,
            size,
            total_pages: total_pages(total_count, size),
        }
    }
}

/// `ceil(total / size)`; zero items means zero pages.
pub fn total_pages(total: u64, size: u32) -> u64 {
    if size == 0 {
        return 0;
    }
    total.div_ceil(size as u64)
}
