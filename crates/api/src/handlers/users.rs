//! Account registration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use logbook_core::error::CoreError;
use logbook_core::validation::FieldViolation;
use logbook_db::models::user::{CreateUser, UserResponse};
use logbook_db::repositories::UserRepo;

use crate::auth::password::{hash_password, MIN_PASSWORD_LEN};
use crate::error::{AppError, AppJson, AppResult};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    /// Optional display name; stored as the empty string when absent.
    #[validate(length(min = 1, max = 100, message = "name must be between 1 and 100 characters"))]
    pub name: Option<String>,
}

// Keep the derive bound and the exported constant in step.
const _: [(); MIN_PASSWORD_LEN] = [(); 8];

/// POST `/api/users`
///
/// Registers a new account. The email must be unique; the password is
/// stored only as an Argon2id hash.
pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<UserResponse>>)> {
    input
        .validate()
        .map_err(|e| CoreError::Validation(field_violations(&e)))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: input.email,
            password_hash,
            name: input.name.unwrap_or_default(),
        },
    )
    .await
    .map_err(|err| match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::BadRequest("Email is already registered".to_string())
        }
        _ => err.into(),
    })?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            user.into(),
            "User registered successfully",
        )),
    ))
}

/// Flatten `validator` errors into the project's field-violation shape.
fn field_violations(errors: &validator::ValidationErrors) -> Vec<FieldViolation> {
    let mut violations: Vec<FieldViolation> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"));
                FieldViolation::new(field, message)
            })
        })
        .collect();
    violations.sort_by(|a, b| a.field.cmp(&b.field));
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_rejects_bad_email_and_short_password() {
        let input = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            name: Some("Susilo".to_string()),
        };
        let errors = input.validate().unwrap_err();
        let violations = field_violations(&errors);
        assert!(violations.iter().any(|v| v.field == "email"));
        assert!(violations.iter().any(|v| v.field == "password"));
    }

    #[test]
    fn register_request_accepts_valid_input() {
        let input = RegisterRequest {
            email: "intern@example.com".to_string(),
            password: "a-long-enough-password".to_string(),
            name: Some("Susilo".to_string()),
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn name_is_optional_but_not_empty() {
        let input = RegisterRequest {
            email: "intern@example.com".to_string(),
            password: "a-long-enough-password".to_string(),
            name: None,
        };
        assert!(input.validate().is_ok());

        let input = RegisterRequest {
            name: Some(String::new()),
            ..input
        };
        let errors = input.validate().unwrap_err();
        assert!(field_violations(&errors).iter().any(|v| v.field == "name"));
    }
}
