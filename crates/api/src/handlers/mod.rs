//! Request handlers.
//!
//! - [`activities`] -- activity CRUD, bulk create, CSV import/export.
//! - [`auth`] -- login, refresh-token rotation, logout.
//! - [`users`] -- account registration.

pub mod activities;
pub mod auth;
pub mod users;
