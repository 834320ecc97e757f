//! Repository for review comments (`comments.json`).

use std::sync::Arc;

use chrono::Utc;
use folio_core::error::CoreError;
use folio_core::ids::IdGenerator;
use folio_core::types::DbId;

use crate::collection::Collection;
use crate::models::comment::{Comment, CreateComment};
use crate::repositories::max_id;
use crate::store::{RecordStore, StoreError};

/// Comments scoped to a review. The repository does not check that the
/// referenced review exists.
pub struct CommentRepo {
    comments: Collection<Comment>,
    ids: IdGenerator,
}

impl CommentRepo {
    pub async fn open(store: Arc<dyn RecordStore<Comment>>) -> Self {
        let comments = Collection::open("comments", store, Vec::new()).await;
        let floor = comments.read(|c| max_id(c.iter().map(|c| c.id))).await;
        Self {
            comments,
            ids: IdGenerator::starting_after(floor),
        }
    }

    /// Append a comment stamped with the current time.
    pub async fn add(&self, input: CreateComment) -> Result<Comment, CoreError> {
        input.validate()?;

        let comment = Comment {
            id: self.ids.next_id(),
            review_id: input.review_id.unwrap_or_default(),
            username: input.username.unwrap_or_default(),
            comment: input.comment.unwrap_or_default(),
            date: Utc::now(),
        };

        self.comments.push(comment.clone()).await;

        tracing::debug!(comment_id = comment.id, review_id = comment.review_id, "Comment added");
        Ok(comment)
    }

    /// Comments on `review_id` in insertion order.
    pub async fn list_for_review(&self, review_id: DbId) -> Vec<Comment> {
        self.comments
            .read(|comments| {
                comments
                    .iter()
                    .filter(|c| c.review_id == review_id)
                    .cloned()
                    .collect()
            })
            .await
    }

    /// Remove every comment on `review_id`, returning how many were removed.
    pub(crate) async fn delete_for_review(&self, review_id: DbId) -> usize {
        self.comments.retain(|c| c.review_id != review_id).await
    }

    /// Wait until all comments are written to their store.
    pub async fn flush(&self) -> Result<(), StoreError> {
        self.comments.flush().await
    }
}
