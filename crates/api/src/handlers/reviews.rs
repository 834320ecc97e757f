//! Handlers for the `/reviews` resource.
//!
//! Create and update take `multipart/form-data` with the text fields
//! `title`, `author`, `review` and the optional image files `cover` and
//! `fullImage`.

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::Json;
use folio_core::guard::require_owner_or_admin;
use folio_core::media::validate_image_format;
use folio_core::types::DbId;
use folio_core::validation::require_all;
use folio_db::models::review::{CreateReview, Review, UpdateReview};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::PathParam;
use crate::media::ImageUpload;
use crate::middleware::auth::{AuthSession, MaybeSession};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /reviews`.
#[derive(Debug, Default, Deserialize)]
pub struct ReviewListParams {
    /// Case-insensitive title filter.
    pub q: Option<String>,
}

/// Fields of a review form. Blank text fields count as absent.
#[derive(Debug, Default)]
pub struct ReviewForm {
    pub title: Option<String>,
    pub author: Option<String>,
    pub review: Option<String>,
    pub cover: Option<ImageUpload>,
    pub full_image: Option<ImageUpload>,
}

impl ReviewForm {
    /// Read every part of a multipart body. Unknown fields are ignored.
    pub async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = ReviewForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "title" | "author" | "review" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;
                    let value = Some(text).filter(|t| !t.trim().is_empty());
                    match name.as_str() {
                        "title" => form.title = value,
                        "author" => form.author = value,
                        _ => form.review = value,
                    }
                }
                "cover" | "fullImage" => {
                    let file_name = field.file_name().unwrap_or("").to_string();
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?;

                    // Browsers send an empty part for an untouched file input.
                    if bytes.is_empty() {
                        continue;
                    }
                    validate_image_format(
                        Some(file_name.as_str()).filter(|n| !n.is_empty()),
                        content_type.as_deref(),
                    )?;

                    let upload = ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    };
                    if name == "cover" {
                        form.cover = Some(upload);
                    } else {
                        form.full_image = Some(upload);
                    }
                }
                _ => {} // ignore unknown fields
            }
        }

        Ok(form)
    }
}

/// Upload both images, if present, returning their URLs.
async fn upload_images(
    state: &AppState,
    cover: Option<ImageUpload>,
    full_image: Option<ImageUpload>,
) -> AppResult<(Option<String>, Option<String>)> {
    let cover = match cover {
        Some(image) => Some(state.media.upload(image).await?),
        None => None,
    };
    let full_image = match full_image {
        Some(image) => Some(state.media.upload(image).await?),
        None => None,
    };
    Ok((cover, full_image))
}

/// GET /api/v1/reviews[?q=]
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ReviewListParams>,
) -> Json<DataResponse<Vec<Review>>> {
    let reviews = match params.q.as_deref() {
        Some(query) => state.reviews().search(query).await,
        None => state.reviews().list().await,
    };
    Json(DataResponse { data: reviews })
}

/// GET /api/v1/reviews/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    PathParam(id): PathParam<DbId>,
) -> AppResult<Json<DataResponse<Review>>> {
    let review = state.reviews().get(id).await?;
    Ok(Json(DataResponse { data: review }))
}

/// POST /api/v1/reviews
pub async fn create(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<Review>>)> {
    let form = ReviewForm::from_multipart(multipart).await?;
    require_all(&[
        ("title", form.title.as_deref()),
        ("author", form.author.as_deref()),
        ("review", form.review.as_deref()),
    ])?;

    let (cover, full_image) = upload_images(&state, form.cover, form.full_image).await?;
    let input = CreateReview {
        title: form.title.unwrap_or_default(),
        author: form.author.unwrap_or_default(),
        review: form.review.unwrap_or_default(),
        cover,
        full_image,
    };

    let review = state.reviews().create(&session, input).await;
    Ok((StatusCode::CREATED, Json(DataResponse { data: review })))
}

/// PUT /api/v1/reviews/{id}
///
/// Owner or admin only. Omitted fields and images keep their stored value.
pub async fn update(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
    PathParam(id): PathParam<DbId>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<Review>>> {
    // Reject before uploading anything.
    let existing = state.reviews().get(id).await?;
    require_owner_or_admin(&session, existing.user_id)?;

    let form = ReviewForm::from_multipart(multipart).await?;
    let (cover, full_image) = upload_images(&state, form.cover, form.full_image).await?;
    let changes = UpdateReview {
        title: form.title,
        author: form.author,
        review: form.review,
        cover,
        full_image,
    };

    let review = state.reviews().update(&session, id, changes).await?;
    Ok(Json(DataResponse { data: review }))
}

/// DELETE /api/v1/reviews/{id}
///
/// Admin only. Also removes the review's comments.
pub async fn delete(
    State(state): State<AppState>,
    MaybeSession(session): MaybeSession,
    PathParam(id): PathParam<DbId>,
) -> AppResult<StatusCode> {
    state.reviews().delete(session.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
