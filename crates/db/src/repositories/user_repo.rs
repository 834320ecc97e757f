//! Repository for the user directory (`users.json`).

use std::sync::Arc;

use folio_core::error::CoreError;
use folio_core::ids::IdGenerator;
use folio_core::password::{hash_password, verify_password};
use folio_core::types::DbId;
use folio_core::validation::require_all;

use crate::collection::Collection;
use crate::models::user::{AdminSeed, PublicUser, RegisterUser, User};
use crate::repositories::max_id;
use crate::store::{RecordStore, StoreError};

/// Id of the administrator seeded into an empty directory.
pub const SEEDED_ADMIN_ID: DbId = 1;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Identity records, credential checks and uniqueness enforcement.
pub struct UserRepo {
    users: Collection<User>,
    ids: IdGenerator,
    /// Verified against when the username is unknown, so both failure paths
    /// run Argon2.
    decoy_hash: String,
}

impl UserRepo {
    /// Load the directory. An empty or unusable store is replaced by a single
    /// administrator built from `admin`. Plaintext passwords left by earlier
    /// versions are hashed and the migrated directory is queued for writing.
    pub async fn open(
        store: Arc<dyn RecordStore<User>>,
        admin: &AdminSeed,
    ) -> Result<Self, CoreError> {
        let password_hash = hash_password(&admin.password)
            .map_err(|e| CoreError::Internal(format!("Failed to hash admin password: {e}")))?;
        let decoy_hash = password_hash.clone();
        let seed = vec![User {
            id: SEEDED_ADMIN_ID,
            username: admin.username.clone(),
            email: admin.email.clone(),
            password_hash,
            legacy_password: None,
            is_admin: true,
        }];

        let users = Collection::open("users", store, seed).await;
        migrate_plaintext_passwords(&users).await?;
        let floor = users.read(|u| max_id(u.iter().map(|u| u.id))).await;

        Ok(Self {
            users,
            ids: IdGenerator::starting_after(floor),
            decoy_hash,
        })
    }

    /// Register a new, non-admin user.
    pub async fn register(&self, input: RegisterUser) -> Result<PublicUser, CoreError> {
        require_all(&[
            ("username", input.username.as_deref()),
            ("email", input.email.as_deref()),
            ("password", input.password.as_deref()),
        ])?;
        let username = input.username.unwrap_or_default();
        let email = input.email.unwrap_or_default();
        let password = input.password.unwrap_or_default();

        // Hash before taking the lock; uniqueness is decided under it.
        let password_hash = hash_password(&password)
            .map_err(|e| CoreError::Internal(format!("Failed to hash password: {e}")))?;

        let user = self
            .users
            .mutate(|users| {
                if users.iter().any(|u| u.username == username) {
                    return Err(CoreError::Conflict("Username already exists".into()));
                }
                if users.iter().any(|u| u.email == email) {
                    return Err(CoreError::Conflict("Email already exists".into()));
                }
                let user = User {
                    id: self.ids.next_id(),
                    username,
                    email,
                    password_hash,
                    legacy_password: None,
                    is_admin: false,
                };
                let public = PublicUser::from(&user);
                users.push(user);
                Ok(public)
            })
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Check credentials. The error is the same whichever field was wrong.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<PublicUser, CoreError> {
        let found = self
            .users
            .read(|users| users.iter().find(|u| u.username == username).cloned())
            .await;

        let Some(user) = found else {
            let _ = verify_password(password, &self.decoy_hash);
            return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.into()));
        };

        match verify_password(password, &user.password_hash) {
            Ok(true) => Ok(PublicUser::from(&user)),
            Ok(false) => Err(CoreError::Unauthorized(INVALID_CREDENTIALS.into())),
            Err(e) => {
                tracing::error!(user_id = user.id, error = %e, "Stored password hash is unreadable");
                Err(CoreError::Unauthorized(INVALID_CREDENTIALS.into()))
            }
        }
    }

    pub async fn find_by_id(&self, id: DbId) -> Option<PublicUser> {
        self.users
            .read(|users| users.iter().find(|u| u.id == id).map(PublicUser::from))
            .await
    }

    /// All users in registration order, without credentials.
    pub async fn list(&self) -> Vec<PublicUser> {
        self.users
            .read(|users| users.iter().map(PublicUser::from).collect())
            .await
    }

    /// Wait until the directory is written to its store.
    pub async fn flush(&self) -> Result<(), StoreError> {
        self.users.flush().await
    }
}

/// Replace every plaintext `password` with an Argon2 hash.
async fn migrate_plaintext_passwords(users: &Collection<User>) -> Result<(), CoreError> {
    let pending = users.read(|u| u.iter().filter(|u| u.needs_migration()).count()).await;
    if pending == 0 {
        return Ok(());
    }

    users
        .mutate(|records| {
            for user in records.iter_mut().filter(|u| u.needs_migration()) {
                if let Some(plain) = user.legacy_password.take() {
                    user.password_hash = hash_password(&plain).map_err(|e| {
                        CoreError::Internal(format!("Failed to hash stored password: {e}"))
                    })?;
                }
            }
            Ok::<_, CoreError>(())
        })
        .await?;

    tracing::info!(count = pending, "Migrated plaintext passwords to Argon2 hashes");
    Ok(())
}
