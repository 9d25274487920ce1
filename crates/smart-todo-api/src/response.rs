//! Standard list response envelope and paging helpers.

use serde::{Deserialize, Serialize};

use smart_todo_core::defaults::{PAGE_LIMIT, PAGE_LIMIT_MAX, PAGE_OFFSET};

/// Pagination metadata for list responses.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct PaginationMeta {
    /// Total number of items matching the query (across all pages)
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    /// True if more items are available after this page
    pub has_more: bool,
}

/// List response wrapper with pagination metadata.
///
/// ```json
/// {
///   "data": [...],
///   "pagination": {"total": 120, "limit": 50, "offset": 0, "has_more": true}
/// }
/// ```
#[derive(Serialize, Deserialize, Debug)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T: Serialize> ListResponse<T> {
    /// `has_more` is derived from offset, page length and total.
    pub fn new(data: Vec<T>, total: i64, limit: i64, offset: i64) -> Self {
        let total = usize::try_from(total).unwrap_or(0);
        let offset = usize::try_from(offset).unwrap_or(0);
        let has_more = offset + data.len() < total;
        Self {
            data,
            pagination: PaginationMeta {
                total,
                limit: usize::try_from(limit).unwrap_or(0),
                offset,
                has_more,
            },
        }
    }
}

/// Resolve `limit`/`offset` query values into bounded numbers.
pub fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(PAGE_LIMIT).clamp(1, PAGE_LIMIT_MAX);
    let offset = offset.unwrap_or(PAGE_OFFSET).max(0);
    (limit, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_more() {
        let resp = ListResponse::new(vec![1, 2], 5, 2, 0);
        assert!(resp.pagination.has_more);

        let resp = ListResponse::new(vec![5], 5, 2, 4);
        assert!(!resp.pagination.has_more);
    }

    #[test]
    fn test_page_bounds() {
        assert_eq!(page(None, None), (50, 0));
        assert_eq!(page(Some(0), Some(-3)), (1, 0));
        assert_eq!(page(Some(10_000), Some(20)), (500, 20));
    }
}
