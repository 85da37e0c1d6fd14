//! Studio retouching of product photos by an image-generating model.

use crate::gateway::{ImageFormat, PayloadPolicy, ToolGateway};
use crate::observability::Logger;
use crate::orchestration::{Orchestrator, RuntimeConfig};
use crate::provider::{ModelProvider, Transcript};
use crate::services::{validate_upload, ImageUpload, ServiceError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Message returned when the model streams no text with its image.
pub const DEFAULT_RETOUCH_MESSAGE: &str = "Image processed successfully";

/// Instruction sent alongside the raw photo.
pub const RETOUCH_PROMPT: &str = "Role: Professional e-commerce photo retoucher
Task: Transform the supplied raw image of a single product into a studio-quality listing photo.
Constraints
Do NOT modify the product's shape, color, label, proportion, or surface texture.
Remove current background and replace with a pure-white (#FFFFFF) seamless backdrop that meets Amazon / Etsy / Shopify specs.
Add a subtle, soft drop-shadow directly beneath the product to keep it grounded and realistic (no harsh or floating shadows).
Correct exposure, white balance, and contrast so true colors are accurate and vibrant, with no HDR or \"plastic\" look.
Apply gentle clarity/noise control only where needed; avoid halos or sharpening artifacts.
Preserve natural highlights and material details.
Output specs: 3000 x 3000 px, sRGB, 300 ppi, high-quality JPEG (<= 2 MB).
Deliverable: One finished image ready for immediate upload to e-commerce platforms.";

/// The retouched photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetouchedImage {
    /// Image bytes as streamed by the model
    pub data: Vec<u8>,
    /// Declared mime type, or the sniffed one when the model declared none
    pub mime_type: String,
    /// Text the model streamed alongside the image
    pub message: String,
}

/// Sends a photo and the retouch prompt, keeps the image the model streams back.
pub struct ImageRetoucher {
    orchestrator: Orchestrator,
    policy: PayloadPolicy,
    logger: Option<Arc<Logger>>,
}

impl ImageRetoucher {
    /// Create a retoucher. The model gets no tools.
    pub fn new(provider: Arc<dyn ModelProvider>, policy: PayloadPolicy) -> Self {
        Self::with_config(provider, policy, RuntimeConfig::default())
    }

    /// Create a retoucher with explicit loop limits.
    pub fn with_config(provider: Arc<dyn ModelProvider>, policy: PayloadPolicy, config: RuntimeConfig) -> Self {
        Self {
            orchestrator: Orchestrator::with_config(provider, Arc::new(ToolGateway::new()), config),
            policy,
            logger: None,
        }
    }

    /// Record calls in a markdown log.
    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Retouch an uploaded photo.
    pub async fn retouch(&self, upload: ImageUpload) -> Result<RetouchedImage, ServiceError> {
        let started = Instant::now();
        let format = validate_upload(&upload, &self.policy)?;
        let input_bytes = upload.data.len() as u64;

        let mut transcript = Transcript::from_user(RETOUCH_PROMPT);
        transcript.push_user_binary(upload.data, format.mime_type());

        let result = self
            .orchestrator
            .run_transcript(transcript, None, CancellationToken::new())
            .await
            .map_err(ServiceError::from)
            .and_then(|run| {
                let payload = run.payload.ok_or(ServiceError::NoImage)?;
                let mime_type = payload
                    .mime_type
                    .or_else(|| ImageFormat::sniff(&payload.data).map(|f| f.mime_type().to_string()))
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let text = run.output.as_text();
                let message = match text.trim() {
                    "" => DEFAULT_RETOUCH_MESSAGE.to_string(),
                    trimmed => trimmed.to_string(),
                };
                Ok(RetouchedImage {
                    data: payload.data,
                    mime_type,
                    message,
                })
            });

        let mut sizes = HashMap::from([("input_bytes".to_string(), input_bytes)]);
        match &result {
            Ok(image) => {
                info!(bytes = image.data.len(), mime = %image.mime_type, "image retouched");
                sizes.insert("output_bytes".to_string(), image.data.len() as u64);
                sizes.insert("response_text_length".to_string(), image.message.chars().count() as u64);
            }
            Err(e) => {
                warn!(error = %e, "retouch failed");
                self.log(|logger| logger.log_error(&e.to_string(), None));
            }
        }
        self.log(|logger| logger.log_api_call("retouch_image", started.elapsed(), result.is_ok(), &sizes));

        result
    }

    fn log<F>(&self, write: F)
    where
        F: FnOnce(&Logger) -> anyhow::Result<()>,
    {
        if let Some(logger) = &self.logger {
            if let Err(e) = write(logger) {
                warn!(error = %format!("{e:#}"), "failed to write retouch log");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StreamChunk;
    use crate::test_utils::ScriptedProvider;

    const JPEG: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF";
    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn upload() -> ImageUpload {
        ImageUpload::new(JPEG.to_vec(), "image/jpeg").with_filename("raw.jpg")
    }

    #[tokio::test]
    async fn test_retouch_returns_streamed_image_and_text() {
        let provider = ScriptedProvider::new(vec![vec![
            StreamChunk::text("Background removed. "),
            StreamChunk::binary(0, PNG[..6].to_vec(), Some("image/png")),
            StreamChunk::binary(0, PNG[6..].to_vec(), None),
            StreamChunk::Done,
        ]]);
        let retoucher = ImageRetoucher::new(provider, PayloadPolicy::default());

        let image = retoucher.retouch(upload()).await.unwrap();
        assert_eq!(image.data, PNG);
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.message, "Background removed.");
    }

    #[tokio::test]
    async fn test_default_message_and_sniffed_mime() {
        let provider = ScriptedProvider::new(vec![vec![StreamChunk::binary(0, JPEG.to_vec(), None)]]);
        let retoucher = ImageRetoucher::new(provider, PayloadPolicy::default());

        let image = retoucher.retouch(upload()).await.unwrap();
        assert_eq!(image.message, DEFAULT_RETOUCH_MESSAGE);
        assert_eq!(image.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_text_only_answer_is_no_image() {
        let provider = ScriptedProvider::new(vec![vec![StreamChunk::text("I can't edit images.")]]);
        let retoucher = ImageRetoucher::new(provider, PayloadPolicy::default());

        let err = retoucher.retouch(upload()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NoImage));
    }

    #[tokio::test]
    async fn test_oversized_upload_rejected() {
        let provider = ScriptedProvider::new(vec![]);
        let retoucher = ImageRetoucher::new(provider.clone(), PayloadPolicy::with_max_bytes(4));

        let err = retoucher.retouch(upload()).await.unwrap_err();
        assert!(err.to_string().contains("invalid image"));
        assert_eq!(provider.invocations(), 0);
    }
}
