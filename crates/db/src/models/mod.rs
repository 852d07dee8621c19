//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the database
//! row, plus whatever create/update DTOs the repository needs. Typed create
//! and patch inputs for activities live in `logbook_core` because they are
//! produced by the validator, not deserialized directly.

pub mod activity;
pub mod session;
pub mod user;
