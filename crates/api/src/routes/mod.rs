pub mod auth;
pub mod comments;
pub mod health;
pub mod reviews;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                   register (public)
/// /auth/login                      login (public)
/// /auth/logout                     logout (requires session)
/// /auth/me                         current user (requires session)
///
/// /reviews                         list/search (public), create (requires session)
/// /reviews/{id}                    get (public), update (owner or admin), delete (admin)
/// /reviews/{id}/comments           list comments (public)
///
/// /comments                        add comment (public)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/reviews", reviews::router())
        .nest("/comments", comments::router())
}
