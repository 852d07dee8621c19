//! Route definitions for the `/users` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST / -> register
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(users::register))
}
