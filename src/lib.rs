//! Stox Agent Kit - tool-calling orchestration and resilient structured
//! extraction for product image services
//!
//! The kit provides a set of feature-gated modules:
//!
//! - **`config`** - Configuration and environment loading
//! - **`observability`** - Markdown session log and `tracing` setup
//! - **`provider`** - Model provider contract, transcript and stream chunk types
//! - **`stream`** - Single-pass multiplexing of text, binary and tool-call chunks
//! - **`extraction`** - Layered recovery of named fields from model prose
//! - **`gateway`** - Tool registry, JSON-RPC tools and payload policy
//! - **`orchestration`** - Bounded model/tool round-trip loop
//! - **`services`** - SEO agent, product image analyzer and retoucher
//!
//! # Features
//!
//! Enable the features you need in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! stox-agent = { version = "0.3", features = ["extraction"] }
//! # Or the loop and its tools:
//! stox-agent = { version = "0.3", features = ["orchestration"] }
//! # Or enable everything:
//! stox-agent = { version = "0.3", features = ["all"] }
//! ```
//!
//! # Example: Extracting a listing from model prose
//!
//! ```ignore
//! use stox_agent::extraction::{Confidence, StructuredExtractor};
//!
//! let extractor = StructuredExtractor::product_listing()?;
//! let result = extractor.extract("Title: \"Red Sneaker\"\nDescription: \"Leather upper\"")?;
//! assert_eq!(result.get("title"), Some("Red Sneaker"));
//! assert_eq!(result.confidence, Confidence::KeyValue);
//! ```
//!
//! # Example: Running the loop
//!
//! ```ignore
//! use std::sync::Arc;
//! use stox_agent::gateway::{RpcClient, SeoAnalysisTool, ToolGateway};
//! use stox_agent::orchestration::Orchestrator;
//!
//! async fn example(provider: Arc<dyn stox_agent::provider::ModelProvider>) -> anyhow::Result<()> {
//!     let mut gateway = ToolGateway::new();
//!     gateway.register(Arc::new(SeoAnalysisTool::new(RpcClient::new("http://localhost:50071/rpc"))))?;
//!
//!     let orchestrator = Orchestrator::new(provider, Arc::new(gateway));
//!     let run = orchestrator.run("Please analyze this image URL for SEO purposes: https://cdn/x.jpg", None).await?;
//!     println!("{}", run.output.as_text());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Configuration management (enabled with the `config` feature)
#[cfg(feature = "config")]
pub mod config;

/// Observability utilities (enabled with the `observability` feature)
#[cfg(feature = "observability")]
pub mod observability;

/// Model provider abstraction (enabled with the `provider` feature)
#[cfg(feature = "provider")]
pub mod provider;

/// Stream multiplexing (enabled with the `provider` feature)
#[cfg(feature = "provider")]
pub mod stream;

/// Structured extraction (enabled with the `extraction` feature)
#[cfg(feature = "extraction")]
pub mod extraction;

/// Tool invocation gateway (enabled with the `gateway` feature)
#[cfg(feature = "gateway")]
pub mod gateway;

/// Orchestration loop (enabled with the `orchestration` feature)
#[cfg(feature = "orchestration")]
pub mod orchestration;

/// Product image services (enabled with the `services` feature)
#[cfg(feature = "services")]
pub mod services;

/// Scripted test doubles (enabled with the `test-utils` feature)
#[cfg(all(feature = "gateway", any(test, feature = "test-utils")))]
pub mod test_utils;

/// Prelude module for convenient imports
pub mod prelude {
    #[cfg(feature = "config")]
    pub use crate::config::{Configuration, ConfigurationLoader, EnvironmentLoader};

    #[cfg(feature = "observability")]
    pub use crate::observability::{init_tracing, Logger};

    #[cfg(feature = "provider")]
    pub use crate::provider::{
        ModelProvider, Role, StreamChunk, StreamingResponse, ToolCall, Transcript, TurnContent,
    };

    #[cfg(feature = "provider")]
    pub use crate::stream::{StreamError, StreamMultiplexer, StreamOutcome};

    #[cfg(feature = "extraction")]
    pub use crate::extraction::{
        Confidence, ExtractedResult, ExtractionError, FieldSchema, ProductListing,
        StructuredExtractor,
    };

    #[cfg(feature = "gateway")]
    pub use crate::gateway::{
        PayloadPolicy, ToolDefinition, ToolError, ToolGateway, ToolPayload, ToolResult,
        ToolService,
    };

    #[cfg(feature = "orchestration")]
    pub use crate::orchestration::{
        FinalOutput, OrchestrationError, Orchestrator, OrchestratorHandle, RunFailure, RunOutput,
        RuntimeConfig,
    };

    #[cfg(feature = "services")]
    pub use crate::services::{
        AgentReply, ImageRetoucher, ImageUpload, ProductImageAnalyzer, SeoAgentService,
        ServiceError, ServiceSettings,
    };
}
