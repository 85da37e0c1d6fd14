//! Image uploads and their validation.

use crate::gateway::{ImageFormat, PayloadPolicy, ToolError};

/// An image handed to a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Raw bytes
    pub data: Vec<u8>,
    /// Client-side file name, if known
    pub filename: Option<String>,
    /// Declared content type
    pub content_type: String,
}

impl ImageUpload {
    /// Create an upload without a file name.
    pub fn new(data: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            data,
            filename: None,
            content_type: content_type.into(),
        }
    }

    /// Attach the client-side file name.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Check an upload against `policy`.
///
/// The declared content type must fall in the policy's category and a
/// file name, when present, must carry a supported extension. Size and
/// signature are checked on the bytes. Returns the sniffed format.
pub fn validate_upload(upload: &ImageUpload, policy: &PayloadPolicy) -> Result<ImageFormat, ToolError> {
    policy.check_content_type(&upload.content_type)?;

    if let Some(name) = upload.filename.as_deref().filter(|n| !n.trim().is_empty()) {
        if ImageFormat::from_filename(name).is_none() {
            return Err(ToolError::invalid_content_type(
                "a jpeg, jpg, png, gif, bmp or webp file",
                name,
            ));
        }
    }

    policy.validate_image(&upload.data)
}
