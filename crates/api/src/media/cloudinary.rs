//! Upload client for the Cloudinary image API.
//!
//! Uses a signed upload: the request parameters are sorted, joined as
//! `key=value&...`, suffixed with the API secret and hashed with SHA-256.

use async_trait::async_trait;
use folio_core::media::DEFAULT_MEDIA_FOLDER;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::{ImageUpload, MediaError, MediaHost};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Cloudinary account credentials.
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Folder uploads are placed in (default: `book-reviews`).
    pub folder: String,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("folder", &self.folder)
            .finish()
    }
}

impl CloudinaryConfig {
    /// Load credentials from the environment.
    ///
    /// | Env Var                 | Default        |
    /// |-------------------------|----------------|
    /// | `CLOUDINARY_CLOUD_NAME` | --             |
    /// | `CLOUDINARY_API_KEY`    | --             |
    /// | `CLOUDINARY_API_SECRET` | --             |
    /// | `CLOUDINARY_FOLDER`     | `book-reviews` |
    ///
    /// Returns `None` unless all three credentials are set.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let (Some(cloud_name), Some(api_key), Some(api_secret)) = (
            var("CLOUDINARY_CLOUD_NAME"),
            var("CLOUDINARY_API_KEY"),
            var("CLOUDINARY_API_SECRET"),
        ) else {
            return None;
        };

        Some(Self {
            cloud_name,
            api_key,
            api_secret,
            folder: var("CLOUDINARY_FOLDER").unwrap_or_else(|| DEFAULT_MEDIA_FOLDER.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// [`MediaHost`] backed by Cloudinary.
pub struct CloudinaryHost {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryHost {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn upload_url(&self) -> String {
        format!("{API_BASE}/{}/image/upload", self.config.cloud_name)
    }
}

/// Signature over the signed upload parameters, which must already be sorted
/// by name.
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let joined = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    async fn upload(&self, image: ImageUpload) -> Result<String, MediaError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[("folder", self.config.folder.as_str()), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let mut file = Part::bytes(image.bytes).file_name(image.file_name.clone());
        if let Some(content_type) = &image.content_type {
            file = file.mime_str(content_type)?;
        }

        let form = Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("folder", self.config.folder.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self.client.post(self.upload_url()).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(MediaError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let uploaded: UploadResponse = response.json().await?;
        tracing::info!(file_name = %image.file_name, url = %uploaded.secure_url, "Image uploaded");
        Ok(uploaded.secure_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_stable_sha256_hex() {
        let a = sign(&[("folder", "book-reviews"), ("timestamp", "1700000000")], "secret");
        let b = sign(&[("folder", "book-reviews"), ("timestamp", "1700000000")], "secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn signature_depends_on_secret_and_params() {
        let base = sign(&[("timestamp", "1")], "secret");
        assert_ne!(base, sign(&[("timestamp", "2")], "secret"));
        assert_ne!(base, sign(&[("timestamp", "1")], "other"));
    }

    #[test]
    fn debug_output_hides_the_secret() {
        let config = CloudinaryConfig {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "super-secret".into(),
            folder: DEFAULT_MEDIA_FOLDER.into(),
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("demo"));
    }

    #[test]
    fn upload_url_uses_cloud_name() {
        let host = CloudinaryHost::new(CloudinaryConfig {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
            folder: DEFAULT_MEDIA_FOLDER.into(),
        });
        assert_eq!(
            host.upload_url(),
            "https://api.cloudinary.com/v1_1/demo/image/upload"
        );
    }
}
