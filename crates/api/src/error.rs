use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use logbook_core::error::CoreError;
use logbook_db::repositories::BulkInsertError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce the project's
/// `{ success: false, error, details? }` envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `logbook_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A failed transactional bulk insert.
    #[error(transparent)]
    BulkInsert(#[from] BulkInsertError),

    /// A CSV import whose rows failed to parse.
    #[error("CSV import error")]
    CsvImport(Vec<logbook_core::csv::RowError>),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// `Json` extractor whose rejection is the project's error envelope
/// instead of axum's plain-text default.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("Invalid JSON body: {rejection}"))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    json!({
                        "success": false,
                        "error": format!("{entity} not found"),
                        "details": { "id": id },
                    }),
                ),
                CoreError::Validation(violations) => (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "success": false,
                        "error": "Validation error",
                        "details": violations,
                    }),
                ),
                CoreError::BatchValidation { index, violations } => (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "success": false,
                        "error": format!("Validation error at item {index}"),
                        "details": { "index": index, "violations": violations },
                    }),
                ),
                CoreError::Unauthorized(msg) => (
                    StatusCode::UNAUTHORIZED,
                    json!({ "success": false, "error": msg }),
                ),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal_body()
                }
            },

            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                internal_body()
            }

            AppError::BulkInsert(err) => {
                tracing::error!(error = %err.source, index = err.index, "Bulk insert failed");
                (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "success": false,
                        "error": format!("Bulk creation failed at item {}", err.index),
                        "details": { "index": err.index },
                    }),
                )
            }

            AppError::CsvImport(rows) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "success": false,
                    "error": "CSV import error",
                    "details": rows,
                }),
            ),

            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "success": false, "error": msg }),
            ),

            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal_body()
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Generic 500 body. Details stay in the server log, never in the response.
fn internal_body() -> (StatusCode, serde_json::Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "success": false, "error": "Internal server error" }),
    )
}
