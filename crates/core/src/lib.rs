//! Domain logic for the logbook backend.
//!
//! This crate has no I/O: it holds the activity types, the field-level
//! schema validator, pagination arithmetic, and the CSV import/export
//! adapter. The `db` and `api` crates build on top of it.

pub mod activity;
pub mod csv;
pub mod error;
pub mod pagination;
pub mod types;
pub mod validation;
