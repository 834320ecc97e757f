//! User entity model and DTOs.

use folio_core::guard::Session;
use folio_core::types::DbId;
use serde::{Deserialize, Serialize};

/// Full user record as stored in `users.json`.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`PublicUser`] for external-facing output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub password_hash: String,
    /// Plaintext credential found in files from earlier versions. Hashed into
    /// `password_hash` when the directory is opened and never written back.
    #[serde(rename = "password", default, skip_serializing)]
    pub legacy_password: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl User {
    /// Whether this record still carries a plaintext credential.
    pub fn needs_migration(&self) -> bool {
        self.legacy_password.is_some()
    }
}

/// User record minus the credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
}

impl PublicUser {
    /// The session established when this user logs in.
    pub fn session(&self) -> Session {
        Session {
            user_id: self.id,
            username: self.username.clone(),
            is_admin: self.is_admin,
        }
    }
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// DTO for registering a new user. Fields are optional so that a missing
/// field surfaces as a validation error rather than a decode failure.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Credentials of the administrator seeded into an empty directory.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Default for AdminSeed {
    fn default() -> Self {
        Self {
            username: "admin".into(),
            email: "admin@example.com".into(),
            password: "admin123".into(),
        }
    }
}
