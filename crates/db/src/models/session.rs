//! Refresh-token session model.

use sqlx::FromRow;

use logbook_core::types::{Timestamp, UserId};

/// A row from the `sessions` table.
///
/// Only the HMAC digest of the refresh token is stored; the plaintext
/// exists solely in the client's hands.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: uuid::Uuid,
    pub user_id: UserId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub created_at: Timestamp,
}

/// DTO for creating a new session.
#[derive(Debug)]
pub struct CreateSession {
    pub user_id: UserId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
}
