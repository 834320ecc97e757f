//! Session extractors.
//!
//! - [`auth::MaybeSession`] -- the caller's session, if any.
//! - [`auth::AuthSession`] -- requires a session (401 otherwise).

pub mod auth;
