pub mod activities;
pub mod auth;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                      login (public)
/// /auth/refresh                    refresh (public)
/// /auth/logout                     logout (requires session)
///
/// /users                           register (public)
///
/// /activities                      create one or many (POST)
/// /activities/{author}             paginated list (GET)
/// /activities/{author}/export      CSV download (GET)
/// /activities/import               CSV upload (POST)
/// /activities/update/{id}          partial update (PUT)
/// /activities/delete/{id}          delete (DELETE)
/// ```
///
/// `/health` is mounted at the root, outside this tree.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/activities", activities::router())
}
