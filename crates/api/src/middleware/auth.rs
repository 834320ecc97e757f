//! Session extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use folio_core::guard::{require_authenticated, Session};

use crate::auth::session::{token_from_headers, validate_token};
use crate::error::AppError;
use crate::state::AppState;

/// The caller's session, or `None` for anonymous requests.
///
/// A missing, malformed or expired token all count as anonymous.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

impl FromRequestParts<AppState> for MaybeSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = token_from_headers(&parts.headers) else {
            return Ok(MaybeSession(None));
        };

        match validate_token(token, &state.config.session) {
            Ok(claims) => Ok(MaybeSession(Some(claims.into()))),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid session token");
                Ok(MaybeSession(None))
            }
        }
    }
}

/// An authenticated session. Rejects anonymous requests with 401.
///
/// ```ignore
/// async fn my_handler(AuthSession(session): AuthSession) -> AppResult<Json<()>> {
///     tracing::info!(user_id = session.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthSession(pub Session);

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let MaybeSession(session) = MaybeSession::from_request_parts(parts, state).await?;
        let session = require_authenticated(session.as_ref())?.clone();
        Ok(AuthSession(session))
    }
}
