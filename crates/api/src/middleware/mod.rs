//! Request middleware.
//!
//! - [`auth::AuthUser`] -- per-request authenticated identity, extracted
//!   from a JWT Bearer token.
//! - [`auth::session_gate`] -- path-prefix gate redirecting unauthenticated
//!   requests on protected paths to the login page.

pub mod auth;
