//! Product image analysis: one image in, an SEO listing out.

use crate::extraction::{Confidence, ProductListing};
use crate::gateway::{PayloadFetcher, PayloadPolicy, ToolGateway};
use crate::observability::Logger;
use crate::orchestration::{FinalOutput, Orchestrator, RuntimeConfig};
use crate::provider::{ModelProvider, Transcript};
use crate::services::{validate_upload, ImageUpload, ServiceError};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Instruction sent alongside the product image.
pub const ANALYSIS_PROMPT: &str = r#"Bu görseldeki ürünü analiz et ve şu adımları takip et:

1. Önce görseldeki ürünü tanımla
2. Bu ürün hakkında güncel pazar bilgilerini aramak için web araması yap
3. Benzer ürünlerin fiyat aralıklarını ve özelliklerini araştır
4. Elde ettiğin bilgileri kullanarak aşağıdaki JSON formatında yanıt ver:
{
    "title": "SEO uyumlu ürün başlığı (max 60 karakter)",
    "description": "Detaylı ürün açıklaması (150-300 kelime)",
    "search_info": "Web aramasından elde edilen bilgiler"
}
Açıklama yazarken:
- Ürünün görsel özelliklerini detaylandır
- Web aramasından öğrendiğin güncel bilgileri kullan
- Kullanım alanlarını ve hedef kitleyi belirt
- SEO dostu anahtar kelimeler kullan
- Profesyonel ve satışa yönelik bir dil kullan
ÖNEMLİ: Mutlaka web araması yap ve bu bilgileri yanıtında kullan."#;

/// Listing recovered from the model's answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    /// SEO title and description
    pub listing: ProductListing,
    /// Tier of the extraction strategy that succeeded
    pub confidence: Confidence,
    /// Full model answer
    pub raw_text: String,
}

/// Sends a product image and the analysis prompt to the model and extracts
/// `{title, description}` from whatever text comes back.
pub struct ProductImageAnalyzer {
    orchestrator: Orchestrator,
    policy: PayloadPolicy,
    fetcher: PayloadFetcher,
    logger: Option<Arc<Logger>>,
}

impl ProductImageAnalyzer {
    /// Create an analyzer. The model gets no tools.
    pub fn new(provider: Arc<dyn ModelProvider>, policy: PayloadPolicy) -> Self {
        Self::with_config(provider, policy, RuntimeConfig::default())
    }

    /// Create an analyzer with explicit loop limits.
    pub fn with_config(provider: Arc<dyn ModelProvider>, policy: PayloadPolicy, config: RuntimeConfig) -> Self {
        Self {
            orchestrator: Orchestrator::with_config(provider, Arc::new(ToolGateway::new()), config),
            fetcher: PayloadFetcher::new(policy.clone()),
            policy,
            logger: None,
        }
    }

    /// Download images with `fetcher` in [`analyze_url`](Self::analyze_url).
    pub fn with_fetcher(mut self, fetcher: PayloadFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Record calls in a markdown log.
    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Upload limits.
    pub fn policy(&self) -> &PayloadPolicy {
        &self.policy
    }

    /// Analyze an uploaded image.
    pub async fn analyze(&self, upload: ImageUpload) -> Result<AnalysisReport, ServiceError> {
        let started = Instant::now();
        let format = validate_upload(&upload, &self.policy)?;
        let image_bytes = upload.data.len() as u64;

        let mut transcript = Transcript::from_user(ANALYSIS_PROMPT);
        transcript.push_user_binary(upload.data, format.mime_type());

        let result = self
            .orchestrator
            .run_transcript(transcript, Some(&ProductListing::schema()), CancellationToken::new())
            .await;

        let report = match result {
            Ok(run) => match run.output {
                FinalOutput::Extracted(extracted) => {
                    let listing = ProductListing::try_from(&extracted)?;
                    Ok(AnalysisReport {
                        listing,
                        confidence: extracted.confidence,
                        raw_text: extracted.raw_source,
                    })
                }
                FinalOutput::Exhausted(message) => Err(ServiceError::Degraded { message }),
                FinalOutput::Text(text) => Err(ServiceError::Degraded { message: text }),
            },
            Err(failure) => Err(ServiceError::from(failure)),
        };

        let mut sizes = HashMap::new();
        sizes.insert("image_bytes".to_string(), image_bytes);
        match &report {
            Ok(report) => {
                info!(%format, confidence = %report.confidence, "image analyzed");
                sizes.insert("response_chars".to_string(), report.raw_text.chars().count() as u64);
                self.log(|logger| {
                    let fields = HashMap::from([
                        ("title".to_string(), report.listing.title.clone()),
                        ("description".to_string(), report.listing.description.clone()),
                    ]);
                    logger.log_extraction(&fields, Some(report.confidence.as_str()))
                });
            }
            Err(e) => {
                warn!(error = %e, "image analysis failed");
                self.log(|logger| {
                    logger.log_extraction(&HashMap::new(), None)?;
                    logger.log_error(&e.to_string(), None)
                });
            }
        }
        self.log(|logger| logger.log_api_call("analyze_image", started.elapsed(), report.is_ok(), &sizes));

        report
    }

    /// Download an image and analyze it.
    pub async fn analyze_url(&self, image_url: &str) -> Result<AnalysisReport, ServiceError> {
        let image_url = image_url.trim();
        if image_url.is_empty() {
            return Err(ServiceError::missing_input("image_url"));
        }

        let fetched = self.fetcher.fetch(image_url).await?;
        let upload = ImageUpload {
            filename: Some(fetched.filename_for(image_url)),
            content_type: fetched.content_type,
            data: fetched.data,
        };
        self.analyze(upload).await
    }

    fn log<F>(&self, write: F)
    where
        F: FnOnce(&Logger) -> anyhow::Result<()>,
    {
        if let Some(logger) = &self.logger {
            if let Err(e) = write(logger) {
                warn!(error = %format!("{e:#}"), "failed to write analysis log");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{StreamChunk, TurnContent};
    use crate::test_utils::ScriptedProvider;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn upload() -> ImageUpload {
        ImageUpload::new(PNG.to_vec(), "image/png").with_filename("mug.png")
    }

    #[tokio::test]
    async fn test_analyze_extracts_listing_from_prose() {
        let provider = ScriptedProvider::new(vec![vec![
            StreamChunk::text("Here you go:\n```json\n{\"title\": \"Ceramic Mug\", "),
            StreamChunk::text("\"description\": \"Hand glazed\", \"search_info\": \"n/a\"}\n```"),
        ]]);
        let analyzer = ProductImageAnalyzer::new(provider.clone(), PayloadPolicy::default());

        let report = analyzer.analyze(upload()).await.unwrap();
        assert_eq!(report.listing.title, "Ceramic Mug");
        assert_eq!(report.listing.description, "Hand glazed");
        assert_eq!(report.confidence, Confidence::Json);

        let sent = &provider.seen_transcripts()[0];
        assert_eq!(sent.turns()[0].content.as_text(), Some(ANALYSIS_PROMPT));
        match &sent.turns()[1].content {
            TurnContent::Binary { data, mime_type } => {
                assert_eq!(data.as_slice(), PNG);
                assert_eq!(mime_type, "image/png");
            }
            other => panic!("expected image turn, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_upload_never_reaches_model() {
        let provider = ScriptedProvider::new(vec![vec![StreamChunk::text("unused")]]);
        let analyzer = ProductImageAnalyzer::new(provider.clone(), PayloadPolicy::default());

        let err = analyzer
            .analyze(ImageUpload::new(PNG.to_vec(), "text/plain"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidImage(_)));
        assert_eq!(provider.invocations(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_answer_reports_preview() {
        let provider = ScriptedProvider::new(vec![vec![StreamChunk::text("I cannot see any product.")]]);
        let analyzer = ProductImageAnalyzer::new(provider, PayloadPolicy::default());

        let err = analyzer.analyze(upload()).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("I cannot see any product."), "{message}");
    }

    #[tokio::test]
    async fn test_blank_url_rejected() {
        let analyzer = ProductImageAnalyzer::new(ScriptedProvider::new(vec![]), PayloadPolicy::default());
        let err = analyzer.analyze_url("  ").await.unwrap_err();
        assert_eq!(err.to_string(), "Missing image_url in request");
    }

    #[tokio::test]
    async fn test_analysis_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Arc::new(Logger::new(Some(&dir.path().join("analyze.md")), None).unwrap());
        let provider = ScriptedProvider::new(vec![vec![StreamChunk::text(
            "title: \"Ceramic Mug\"\ndescription: \"Hand glazed\"",
        )]]);
        let analyzer = ProductImageAnalyzer::new(provider, PayloadPolicy::default()).with_logger(logger);

        let report = analyzer.analyze(upload()).await.unwrap();
        assert_eq!(report.confidence, Confidence::KeyValue);

        let log = std::fs::read_to_string(dir.path().join("analyze.md")).unwrap();
        assert!(log.contains("**Confidence:** keyvalue"));
        assert!(log.contains("- **title:** Ceramic Mug"));
        assert!(log.contains("**Operation:** analyze_image"));
    }
}
