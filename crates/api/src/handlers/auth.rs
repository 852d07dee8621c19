//! Login, refresh-token rotation, and logout.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use logbook_core::error::CoreError;
use logbook_db::models::session::CreateSession;
use logbook_db::models::user::{User, UserResponse};
use logbook_db::repositories::{SessionRepo, UserRepo};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppJson, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair handed out on login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

/// POST `/api/auth/login`
///
/// Credential failures are deliberately indistinguishable: unknown email
/// and wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let invalid = || CoreError::Unauthorized("Invalid email or password".to_string());

    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid)?;

    let matches = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))?;
    if !matches {
        return Err(invalid().into());
    }

    let tokens = issue_tokens(&state, &user).await?;
    Ok(Json(ApiResponse::ok(tokens, "Login successful")))
}

/// POST `/api/auth/refresh`
///
/// Rotation: the presented refresh token's session is revoked and a fresh
/// token pair is issued, so a token can be redeemed exactly once.
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(input): AppJson<RefreshRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let invalid = || CoreError::Unauthorized("Invalid or expired refresh token".to_string());

    let digest = hash_refresh_token(&input.refresh_token, &state.config.session_secret);
    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &digest)
        .await?
        .ok_or_else(invalid)?;

    SessionRepo::revoke(&state.pool, session.id).await?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(invalid)?;

    let tokens = issue_tokens(&state, &user).await?;
    Ok(Json(ApiResponse::ok(tokens, "Token refreshed successfully")))
}

/// POST `/api/auth/logout`
///
/// Revokes every active session for the caller. The access token itself
/// stays valid until it expires; its lifetime is short by design.
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<()>>> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, user.user_id).await?;
    tracing::debug!(user_id = %user.user_id, revoked, "User logged out");
    Ok(Json(ApiResponse::message("Logged out successfully")))
}

/// Sign an access token and mint a stored refresh session for `user`.
async fn issue_tokens(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, &user.email, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Failed to sign access token: {e}")))?;

    let (refresh_token, digest) = generate_refresh_token(&state.config.session_secret);
    let expires_at = chrono::Utc::now()
        + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);
    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: digest,
            expires_at,
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: user.clone().into(),
    })
}
