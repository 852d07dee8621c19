//! Pagination arithmetic shared by the repository and API layers.

/// Default page size when the caller does not supply `limit`.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Upper bound on `limit` to keep a single response bounded.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Clamp a caller-supplied limit into `[1, MAX_PAGE_LIMIT]`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
}

/// Clamp a caller-supplied 1-based page number to at least 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// Offset of a 1-based page: `(page - 1) * limit`.
///
/// Saturates on overflow: an absurdly large page number is just a page
/// past the end, which queries as an empty set.
pub fn page_offset(page: i64, limit: i64) -> i64 {
    (page - 1).saturating_mul(limit)
}

/// Total page count: `ceil(total / limit)`. Zero records mean zero pages.
pub fn page_count(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}
