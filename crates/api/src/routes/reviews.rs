//! Route definitions for the `/reviews` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::{comments, reviews};
use crate::state::AppState;

/// Routes mounted at `/reviews`.
///
/// ```text
/// GET    /               -> list (optional ?q= title search)
/// POST   /               -> create (multipart)
/// GET    /{id}           -> get_by_id
/// PUT    /{id}           -> update (multipart)
/// DELETE /{id}           -> delete
/// GET    /{id}/comments  -> comments::list_for_review
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(reviews::list).post(reviews::create))
        .route(
            "/{id}",
            get(reviews::get_by_id)
                .put(reviews::update)
                .delete(reviews::delete),
        )
        .route("/{id}/comments", get(comments::list_for_review))
}
