use std::sync::Arc;

use folio_db::repositories::{CommentRepo, ReviewRepo, UserRepo};
use folio_db::Repositories;

use crate::config::ServerConfig;
use crate::media::MediaHost;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub config: Arc<ServerConfig>,
    /// Where uploaded review images go.
    pub media: Arc<dyn MediaHost>,
}

impl AppState {
    pub fn users(&self) -> &UserRepo {
        &self.repos.users
    }

    pub fn reviews(&self) -> &ReviewRepo {
        &self.repos.reviews
    }

    pub fn comments(&self) -> &CommentRepo {
        &self.repos.comments
    }
}
