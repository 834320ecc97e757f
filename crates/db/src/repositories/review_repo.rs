//! Repository for book reviews (`reviews.json`).

use std::sync::Arc;

use folio_core::error::CoreError;
use folio_core::guard::{require_admin, require_owner_or_admin, Session};
use folio_core::ids::IdGenerator;
use folio_core::types::DbId;
use tokio::sync::RwLock;

use crate::collection::Collection;
use crate::models::comment::{Comment, CreateComment};
use crate::models::review::{CreateReview, Review, UpdateReview};
use crate::repositories::{max_id, CommentRepo};
use crate::store::{RecordStore, StoreError};

/// Reviews with ownership and admin checks. Deleting a review cascades to its
/// comments through the shared [`CommentRepo`].
pub struct ReviewRepo {
    reviews: Collection<Review>,
    comments: Arc<CommentRepo>,
    ids: IdGenerator,
    /// Held exclusively while a review and its comments are removed, and
    /// shared while a comment is checked against its review and appended.
    removals: RwLock<()>,
}

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Review",
        id,
    }
}

impl ReviewRepo {
    pub async fn open(store: Arc<dyn RecordStore<Review>>, comments: Arc<CommentRepo>) -> Self {
        let reviews = Collection::open("reviews", store, Vec::new()).await;
        let floor = reviews.read(|r| max_id(r.iter().map(|r| r.id))).await;
        Self {
            reviews,
            comments,
            ids: IdGenerator::starting_after(floor),
            removals: RwLock::new(()),
        }
    }

    /// Store a new review owned by the session's user. Field contents are
    /// checked by the caller.
    pub async fn create(&self, session: &Session, input: CreateReview) -> Review {
        let review = Review {
            id: self.ids.next_id(),
            title: input.title,
            author: input.author,
            review: input.review,
            user_id: session.user_id,
            username: session.username.clone(),
            cover: input.cover,
            full_image: input.full_image,
        };

        self.reviews.push(review.clone()).await;

        tracing::info!(review_id = review.id, user_id = review.user_id, "Review created");
        review
    }

    /// All reviews in insertion order.
    pub async fn list(&self) -> Vec<Review> {
        self.reviews.read(|reviews| reviews.to_vec()).await
    }

    /// Reviews whose title contains `query`, ignoring case. A blank query
    /// matches everything.
    pub async fn search(&self, query: &str) -> Vec<Review> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.list().await;
        }
        self.reviews
            .read(|reviews| {
                reviews
                    .iter()
                    .filter(|r| r.title.to_lowercase().contains(&needle))
                    .cloned()
                    .collect()
            })
            .await
    }

    pub async fn get(&self, id: DbId) -> Result<Review, CoreError> {
        self.reviews
            .read(|reviews| reviews.iter().find(|r| r.id == id).cloned())
            .await
            .ok_or_else(|| not_found(id))
    }

    /// Comment on an existing review. Fails with NotFound if the review is
    /// unknown, including when it is deleted concurrently.
    pub async fn add_comment(&self, input: CreateComment) -> Result<Comment, CoreError> {
        input.validate()?;
        let _removals = self.removals.read().await;
        if let Some(review_id) = input.review_id {
            self.get(review_id).await?;
        }
        self.comments.add(input).await
    }

    /// Apply `changes` to a review. Only the owner or an admin may do this;
    /// `id`, `userId` and `username` never change.
    pub async fn update(
        &self,
        session: &Session,
        id: DbId,
        changes: UpdateReview,
    ) -> Result<Review, CoreError> {
        let updated = self
            .reviews
            .mutate(|reviews| {
                let review = reviews
                    .iter_mut()
                    .find(|r| r.id == id)
                    .ok_or_else(|| not_found(id))?;
                require_owner_or_admin(session, review.user_id)?;
                changes.apply_to(review);
                Ok::<_, CoreError>(review.clone())
            })
            .await?;

        tracing::info!(review_id = id, user_id = session.user_id, "Review updated");
        Ok(updated)
    }

    /// Remove a review and then every comment on it. Admin only.
    pub async fn delete(&self, session: Option<&Session>, id: DbId) -> Result<(), CoreError> {
        let admin = require_admin(session)?;
        let _removals = self.removals.write().await;

        self.reviews
            .mutate(|reviews| {
                let index = reviews
                    .iter()
                    .position(|r| r.id == id)
                    .ok_or_else(|| not_found(id))?;
                reviews.remove(index);
                Ok::<_, CoreError>(())
            })
            .await?;

        let removed_comments = self.comments.delete_for_review(id).await;
        tracing::info!(
            review_id = id,
            user_id = admin.user_id,
            removed_comments,
            "Review deleted"
        );
        Ok(())
    }

    /// Wait until all reviews are written to their store.
    pub async fn flush(&self) -> Result<(), StoreError> {
        self.reviews.flush().await
    }
}
