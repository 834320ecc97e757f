//! Persistence for the book-review service.
//!
//! Every collection lives in memory and is mirrored to one JSON file. See
//! [`collection`] for the write path and [`repositories`] for the business
//! rules layered on top.

pub mod collection;
pub mod models;
pub mod repositories;
pub mod store;

use std::path::Path;
use std::sync::Arc;

use folio_core::error::CoreError;

use crate::models::comment::Comment;
use crate::models::review::Review;
use crate::models::user::{AdminSeed, User};
use crate::repositories::{CommentRepo, ReviewRepo, UserRepo};
use crate::store::{JsonFileStore, MemoryStore, RecordStore, StoreError};

pub const USERS_FILE: &str = "users.json";
pub const REVIEWS_FILE: &str = "reviews.json";
pub const COMMENTS_FILE: &str = "comments.json";

/// The backing store of each collection.
pub struct Stores {
    pub users: Arc<dyn RecordStore<User>>,
    pub reviews: Arc<dyn RecordStore<Review>>,
    pub comments: Arc<dyn RecordStore<Comment>>,
}

impl Stores {
    /// One JSON file per collection under `data_dir`.
    pub fn json_files(data_dir: &Path) -> Self {
        Self {
            users: Arc::new(JsonFileStore::<User>::new(data_dir.join(USERS_FILE))),
            reviews: Arc::new(JsonFileStore::<Review>::new(data_dir.join(REVIEWS_FILE))),
            comments: Arc::new(JsonFileStore::<Comment>::new(data_dir.join(COMMENTS_FILE))),
        }
    }

    /// Empty in-memory stores.
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryStore::<User>::new()),
            reviews: Arc::new(MemoryStore::<Review>::new()),
            comments: Arc::new(MemoryStore::<Comment>::new()),
        }
    }
}

/// All repositories, opened together at startup.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<UserRepo>,
    pub reviews: Arc<ReviewRepo>,
    pub comments: Arc<CommentRepo>,
}

impl Repositories {
    /// Load every collection from `stores`, seeding the user directory with
    /// `admin` when it is empty.
    pub async fn open(stores: Stores, admin: &AdminSeed) -> Result<Self, CoreError> {
        let users = Arc::new(UserRepo::open(stores.users, admin).await?);
        let comments = Arc::new(CommentRepo::open(stores.comments).await);
        let reviews = Arc::new(ReviewRepo::open(stores.reviews, comments.clone()).await);

        Ok(Self {
            users,
            reviews,
            comments,
        })
    }

    /// Write every collection and wait for the outcome. Every collection is
    /// attempted; the first failure is returned.
    pub async fn flush_all(&self) -> Result<(), StoreError> {
        let users = self.users.flush().await;
        let reviews = self.reviews.flush().await;
        let comments = self.comments.flush().await;
        users.and(reviews).and(comments)
    }
}
