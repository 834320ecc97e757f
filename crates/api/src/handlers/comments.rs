//! Handlers for review comments.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use folio_core::types::DbId;
use folio_db::models::comment::{Comment, CreateComment};

use crate::error::AppResult;
use crate::extract::{JsonBody, PathParam};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/comments
///
/// Open to anonymous callers. The review must exist.
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateComment>,
) -> AppResult<(StatusCode, Json<DataResponse<Comment>>)> {
    let comment = state.reviews().add_comment(input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: comment })))
}

/// GET /api/v1/reviews/{id}/comments
pub async fn list_for_review(
    State(state): State<AppState>,
    PathParam(review_id): PathParam<DbId>,
) -> Json<DataResponse<Vec<Comment>>> {
    let comments = state.comments().list_for_review(review_id).await;
    Json(DataResponse { data: comments })
}
