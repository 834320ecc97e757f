use std::path::PathBuf;

use folio_db::models::user::AdminSeed;

use crate::auth::session::SessionConfig;
use crate::media::cloudinary::CloudinaryConfig;

/// Server configuration loaded from environment variables.
///
/// Everything except the session secret has a default suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    /// `*` allows every origin without cookie credentials.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory holding `users.json`, `reviews.json` and `comments.json`.
    pub data_dir: PathBuf,
    /// Session token configuration (secret, expiry, cookie flags).
    pub session: SessionConfig,
    /// Administrator seeded into an empty user directory.
    pub admin: AdminSeed,
    /// Cloudinary credentials; `None` disables image uploads.
    pub cloudinary: Option<CloudinaryConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `DATA_DIR`             | `./data`                   |
    /// | `ADMIN_USERNAME`       | `admin`                    |
    /// | `ADMIN_EMAIL`          | `admin@example.com`        |
    /// | `ADMIN_PASSWORD`       | `admin123`                 |
    ///
    /// See [`SessionConfig::from_env`] and [`CloudinaryConfig::from_env`] for
    /// the remaining variables.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let data_dir = std::env::var("DATA_DIR")
            .unwrap_or_else(|_| "./data".into())
            .into();

        let defaults = AdminSeed::default();
        let admin = AdminSeed {
            username: std::env::var("ADMIN_USERNAME").unwrap_or(defaults.username),
            email: std::env::var("ADMIN_EMAIL").unwrap_or(defaults.email),
            password: std::env::var("ADMIN_PASSWORD").unwrap_or(defaults.password),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            data_dir,
            session: SessionConfig::from_env(),
            admin,
            cloudinary: CloudinaryConfig::from_env(),
        }
    }
}
