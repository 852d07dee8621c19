use std::sync::Arc;

use crate::config::ServerConfig;
use crate::uploads::UploadStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: logbook_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Proof-file store rooted at the configured upload directory.
    pub uploads: Arc<UploadStore>,
}
