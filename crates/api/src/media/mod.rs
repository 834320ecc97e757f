//! Image hosting for review covers and full-size images.
//!
//! Uploaded files never touch local disk; they are handed to a [`MediaHost`]
//! and only the returned URL is stored on the review.

pub mod cloudinary;

use async_trait::async_trait;

/// An image received in a multipart request, already format-checked.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Errors from the media host layer.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// No media host credentials were configured.
    #[error("Media host is not configured")]
    NotConfigured,

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("Media upload request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The media host returned a non-2xx status code.
    #[error("Media host error ({status}): {body}")]
    Api { status: u16, body: String },
}

/// Somewhere to put uploaded images.
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Store `image` and return its public URL.
    async fn upload(&self, image: ImageUpload) -> Result<String, MediaError>;
}

/// Used when no media host is configured: every upload is rejected.
pub struct UnconfiguredMediaHost;

#[async_trait]
impl MediaHost for UnconfiguredMediaHost {
    async fn upload(&self, _image: ImageUpload) -> Result<String, MediaError> {
        Err(MediaError::NotConfigured)
    }
}
