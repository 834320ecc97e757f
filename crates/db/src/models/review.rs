//! Review entity model and DTOs.

use folio_core::types::DbId;
use serde::{Deserialize, Serialize};

/// A book review as stored in `reviews.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: DbId,
    pub title: String,
    pub author: String,
    pub review: String,
    /// Owner reference. Immutable after creation.
    pub user_id: DbId,
    /// Owner name at creation time. Immutable after creation.
    pub username: String,
    /// External URL of the cover image.
    pub cover: Option<String>,
    /// External URL of the full-size image.
    pub full_image: Option<String>,
}

/// DTO for creating a review. Owner fields come from the session.
#[derive(Debug, Clone, Default)]
pub struct CreateReview {
    pub title: String,
    pub author: String,
    pub review: String,
    pub cover: Option<String>,
    pub full_image: Option<String>,
}

/// DTO for updating a review. `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateReview {
    pub title: Option<String>,
    pub author: Option<String>,
    pub review: Option<String>,
    pub cover: Option<String>,
    pub full_image: Option<String>,
}

impl UpdateReview {
    /// Apply the present fields to `target`.
    pub fn apply_to(self, target: &mut Review) {
        if let Some(title) = self.title {
            target.title = title;
        }
        if let Some(author) = self.author {
            target.author = author;
        }
        if let Some(review) = self.review {
            target.review = review;
        }
        if let Some(cover) = self.cover {
            target.cover = Some(cover);
        }
        if let Some(full_image) = self.full_image {
            target.full_image = Some(full_image);
        }
    }
}
