//! Session gate and authenticated-user extractor.
//!
//! The gate guards whole path prefixes: a request under a protected prefix
//! without a valid access token is redirected to the login page before any
//! handler runs. Handlers that need the caller's identity take [`AuthUser`]
//! as an extractor parameter; the identity travels as an explicit
//! per-request value, never as process-wide state.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use logbook_core::error::CoreError;
use logbook_core::types::UserId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Where unauthenticated requests to protected paths are sent.
pub const LOGIN_PATH: &str = "/auth/login";

/// Path prefixes that require a valid session.
const PROTECTED_PREFIXES: &[&str] = &["/api", "/dashboard"];

/// Paths that pass through the gate without a token check: the auth API
/// itself, user registration, health, and statically served proofs.
const ALLOW_LIST: &[&str] = &["/api/auth", "/api/users", "/health", "/uploads"];

/// Authenticated user for the current request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // The gate already validated requests on protected paths.
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = bearer_token(&parts.headers).ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
        })
    }
}

/// Gate middleware for protected path prefixes.
///
/// Valid token: the verified identity is stored in request extensions and
/// the request proceeds. Missing or invalid token: redirect to
/// [`LOGIN_PATH`]. Paths outside the protected prefixes, and the
/// allow-list, pass straight through.
pub async fn session_gate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if !requires_session(req.uri().path()) {
        return next.run(req).await;
    }

    let claims = bearer_token(req.headers()).and_then(|t| validate_token(t, &state.config.jwt).ok());

    match claims {
        Some(claims) => {
            req.extensions_mut().insert(AuthUser {
                user_id: claims.sub,
                email: claims.email,
            });
            next.run(req).await
        }
        None => {
            tracing::debug!(path = req.uri().path(), "Unauthenticated request, redirecting");
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

/// Whether the gate demands a valid session for this path.
fn requires_session(path: &str) -> bool {
    if ALLOW_LIST.iter().any(|p| matches_prefix(path, p)) {
        return false;
    }
    PROTECTED_PREFIXES.iter().any(|p| matches_prefix(path, p))
}

/// Prefix match on path-segment boundaries: `/api/authx` is not `/api/auth`.
fn matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
