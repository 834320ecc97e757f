//! Repositories own one collection each and enforce its business rules.
//!
//! Each repository is constructed once at startup around a [`Collection`]
//! and shared behind an `Arc`. Errors are [`CoreError`]s; persistence
//! failures are logged by the collection writer and never surface here.
//!
//! [`Collection`]: crate::collection::Collection
//! [`CoreError`]: folio_core::error::CoreError

pub mod comment_repo;
pub mod review_repo;
pub mod user_repo;

pub use comment_repo::CommentRepo;
pub use review_repo::ReviewRepo;
pub use user_repo::UserRepo;

use folio_core::types::DbId;

/// Largest id in `ids`, or zero for an empty collection.
pub(crate) fn max_id(ids: impl Iterator<Item = DbId>) -> DbId {
    ids.max().unwrap_or(0)
}
