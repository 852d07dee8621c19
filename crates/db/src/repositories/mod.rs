//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod activity_repo;
pub mod session_repo;
pub mod user_repo;

pub use activity_repo::{ActivityRepo, BulkInsertError};
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
