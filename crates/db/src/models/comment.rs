//! Comment entity model and DTOs.

use folio_core::error::CoreError;
use folio_core::types::{DbId, Timestamp};
use folio_core::validation::require_all;
use serde::{Deserialize, Serialize};

/// A comment on a review as stored in `comments.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: DbId,
    pub review_id: DbId,
    /// Free-typed display name; not tied to a registered user.
    pub username: String,
    pub comment: String,
    pub date: Timestamp,
}

/// DTO for adding a comment. All three fields are required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    pub username: Option<String>,
    pub comment: Option<String>,
    pub review_id: Option<DbId>,
}

impl CreateComment {
    /// Reject input with any field missing or blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        let review_id = self.review_id.map(|id| id.to_string());
        require_all(&[
            ("username", self.username.as_deref()),
            ("comment", self.comment.as_deref()),
            ("reviewId", review_id.as_deref()),
        ])
    }
}
