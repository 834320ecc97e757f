//! Request handlers.
//!
//! Handlers resolve the caller's session through the extractors in
//! [`crate::middleware`], delegate to the repositories in `folio_db` and map
//! errors via [`AppError`](crate::error::AppError).

pub mod auth;
pub mod comments;
pub mod health;
pub mod reviews;
