//! Handlers for the `/auth` resource (register, login, logout, me).

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::StatusCode;
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use folio_core::error::CoreError;
use folio_db::models::user::{PublicUser, RegisterUser};
use serde::{Deserialize, Serialize};

use crate::auth::session::{clear_session_cookie, issue_token, session_cookie};
use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::middleware::auth::AuthSession;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Successful login: the user plus the token also set as a cookie.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: PublicUser,
    pub token: String,
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<RegisterUser>,
) -> AppResult<(StatusCode, Json<DataResponse<PublicUser>>)> {
    let user = state.users().register(input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: user })))
}

/// POST /api/v1/auth/login
///
/// Check credentials and start a session.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let user = state
        .users()
        .authenticate(&input.username, &input.password)
        .await
        .inspect_err(|_| tracing::info!(username = %input.username, "Failed login attempt"))?;

    let token = issue_token(&user.session(), &state.config.session)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;
    let cookie = session_cookie(&token, &state.config.session);

    tracing::info!(user_id = user.id, "User logged in");
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(DataResponse {
            data: LoginResponse { user, token },
        }),
    ))
}

/// POST /api/v1/auth/logout
///
/// Tokens are stateless, so logging out only clears the cookie.
pub async fn logout(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> impl IntoResponse {
    tracing::info!(user_id = session.user_id, "User logged out");
    (
        AppendHeaders([(SET_COOKIE, clear_session_cookie(&state.config.session))]),
        Json(MessageResponse {
            message: "Logged out successfully",
        }),
    )
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> AppResult<Json<DataResponse<PublicUser>>> {
    let user = state
        .users()
        .find_by_id(session.user_id)
        .await
        .ok_or(AppError::Core(CoreError::Unauthenticated))?;
    Ok(Json(DataResponse { data: user }))
}
