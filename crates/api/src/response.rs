//! Shared response envelope types.
//!
//! Every endpoint answers with the same JSON envelope:
//! `{ success, data?, message?, error?, details?, pagination? }`.
//! Success envelopes are built here; error envelopes are built by
//! [`crate::error::AppError`]'s `IntoResponse` impl.

use serde::Serialize;

use logbook_core::pagination::page_count;

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    /// 1-based page number.
    pub page: i64,
    /// Page size used for the query.
    pub limit: i64,
    /// Total records matching the filter.
    pub total: i64,
    /// Total pages: `ceil(total / limit)`.
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        Self {
            page,
            limit,
            total,
            pages: page_count(total, limit),
        }
    }
}

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> ApiResponse<T> {
    /// `{ success: true, data, message }`
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            pagination: None,
        }
    }

    /// `{ success: true, data, message, pagination }`
    pub fn paginated(data: T, message: impl Into<String>, pagination: Pagination) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            pagination: Some(pagination),
        }
    }
}

impl ApiResponse<()> {
    /// `{ success: true, message }` -- for operations with nothing to return.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            pagination: None,
        }
    }
}
