//! Domain building blocks shared by the storage and HTTP layers.
//!
//! Nothing in this crate performs I/O: it holds the error taxonomy, id
//! generation, the authorization guard, credential hashing and the input
//! validation rules used by the repositories.

pub mod error;
pub mod guard;
pub mod ids;
pub mod media;
pub mod password;
pub mod types;
pub mod validation;
