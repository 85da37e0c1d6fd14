//! Product image services built on the orchestration loop.
//!
//! - [`SeoAgentService`]: chat and image URL analysis through the
//!   `seo_analysis` tool, answering with [`AgentReply`] envelopes
//! - [`ProductImageAnalyzer`]: one image in, an SEO [`ProductListing`](crate::extraction::ProductListing) out
//! - [`ImageRetoucher`]: one photo in, a retouched photo out
//!
//! # Example
//!
//! ```no_run
//! use stox_agent::services::{ProviderFactory, SeoAgentService, ServiceSettings};
//!
//! # async fn run(factory: ProviderFactory) -> anyhow::Result<()> {
//! let settings = ServiceSettings::load(None, None)?;
//! let logger = settings.create_logger()?;
//! let agent = SeoAgentService::new(settings, factory).with_logger(logger);
//!
//! let reply = agent.analyze_image_seo("https://cdn.example.com/shoe.jpg").await;
//! println!("{}", serde_json::to_string_pretty(&reply)?);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod analyzer;
pub mod error;
pub mod retouch;
pub mod settings;
pub mod upload;

pub use agent::{AgentReply, HealthStatus, ProviderFactory, SeoAgentService, SERVICE_NAME};
pub use analyzer::{AnalysisReport, ProductImageAnalyzer, ANALYSIS_PROMPT};
pub use error::ServiceError;
pub use retouch::{ImageRetoucher, RetouchedImage, DEFAULT_RETOUCH_MESSAGE, RETOUCH_PROMPT};
pub use settings::{ServiceSettings, SEO_AGENT_INSTRUCTION};
pub use upload::{validate_upload, ImageUpload};
