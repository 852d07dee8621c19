//! Route definitions for the `/activities` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::activities;
use crate::state::AppState;

/// Routes mounted at `/activities`.
///
/// ```text
/// POST   /                  -> create (JSON object, JSON array, or multipart form)
/// GET    /{author}          -> paginated list
/// GET    /{author}/export   -> CSV download
/// POST   /import            -> CSV upload (multipart)
/// PUT    /update/{id}       -> partial update (multipart form)
/// DELETE /delete/{id}       -> delete
/// ```
///
/// Static segments (`import`, `update`, `delete`) take precedence over the
/// `{author}` capture, so an author literally named "import" cannot be
/// listed. Acceptable: author names are human names.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(activities::create))
        .route("/import", post(activities::import_csv))
        .route("/update/{id}", put(activities::update))
        .route("/delete/{id}", delete(activities::delete))
        .route("/{author}", get(activities::list))
        .route("/{author}/export", get(activities::export_csv))
}
