//! Image upload rules for review covers and full-size images.

use crate::error::CoreError;

/// File extensions accepted for uploaded images.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Content types accepted for uploaded images.
pub const ALLOWED_IMAGE_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Folder uploads are grouped under on the media host.
pub const DEFAULT_MEDIA_FOLDER: &str = "book-reviews";

/// Validate an uploaded image by file name extension, falling back to the
/// declared content type when the name carries no extension.
pub fn validate_image_format(
    file_name: Option<&str>,
    content_type: Option<&str>,
) -> Result<(), CoreError> {
    let ext = file_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase());

    let accepted = match ext {
        Some(ext) => ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()),
        None => content_type
            .map(|ct| ALLOWED_IMAGE_CONTENT_TYPES.contains(&ct.to_ascii_lowercase().as_str()))
            .unwrap_or(false),
    };

    if accepted {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unsupported image format. Supported: {}",
            ALLOWED_IMAGE_EXTENSIONS.join(", ")
        )))
    }
}
