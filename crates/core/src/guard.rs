//! Authorization guard.
//!
//! Pure predicates evaluated against the caller's session. The HTTP layer
//! resolves the session from the request and the repositories call these
//! before mutating anything.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// The identity attached to the current request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: DbId,
    pub username: String,
    pub is_admin: bool,
}

/// Admit any request that carries a session.
pub fn require_authenticated(session: Option<&Session>) -> Result<&Session, CoreError> {
    session.ok_or(CoreError::Unauthenticated)
}

/// Admit only administrators. A missing session is also rejected as
/// forbidden, not unauthenticated.
pub fn require_admin(session: Option<&Session>) -> Result<&Session, CoreError> {
    match session {
        Some(s) if s.is_admin => Ok(s),
        _ => Err(CoreError::Forbidden("Admin rights required".into())),
    }
}

/// Admit the owner of a record or an administrator.
pub fn require_owner_or_admin(session: &Session, owner_id: DbId) -> Result<(), CoreError> {
    if session.is_admin || session.user_id == owner_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "You don't have permission to edit this review".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn session(user_id: DbId, is_admin: bool) -> Session {
        Session {
            user_id,
            username: format!("user{user_id}"),
            is_admin,
        }
    }

    #[test]
    fn authenticated_requires_a_session() {
        assert_matches!(require_authenticated(None), Err(CoreError::Unauthenticated));

        let s = session(7, false);
        assert_eq!(require_authenticated(Some(&s)).unwrap().user_id, 7);
    }

    #[test]
    fn admin_rejects_regular_users_and_anonymous_callers() {
        assert_matches!(require_admin(None), Err(CoreError::Forbidden(_)));
        assert_matches!(
            require_admin(Some(&session(2, false))),
            Err(CoreError::Forbidden(_))
        );
        assert!(require_admin(Some(&session(1, true))).is_ok());
    }

    #[test]
    fn owner_or_admin() {
        assert!(require_owner_or_admin(&session(5, false), 5).is_ok());
        assert!(require_owner_or_admin(&session(1, true), 5).is_ok());
        assert_matches!(
            require_owner_or_admin(&session(6, false), 5),
            Err(CoreError::Forbidden(_))
        );
    }
}
