//! Tool invocation gateway.
//!
//! Tools are registered as [`ToolService`] trait objects in a [`ToolGateway`].
//! The gateway validates arguments against each tool's [`ToolDefinition`],
//! performs a single call under a timeout, and folds every failure into a
//! [`ToolResult`] carrying a typed [`ToolError`].
//!
//! Remote tools speak JSON-RPC 2.0 over HTTP through [`RpcClient`]; image
//! downloads go through a [`PayloadFetcher`] enforcing a [`PayloadPolicy`].
//!
//! # Example
//!
//! ```
//! use stox_agent::gateway::{ImageFormat, PayloadPolicy};
//!
//! let policy = PayloadPolicy::default();
//! assert_eq!(policy.max_bytes, 10 * 1024 * 1024);
//! assert!(policy.accepts_content_type("image/webp"));
//! assert_eq!(ImageFormat::from_filename("shoe.jpg"), Some(ImageFormat::Jpeg));
//! ```

mod definition;
mod error;
#[allow(clippy::module_inception)]
mod gateway;
mod payload;
mod result;
mod rpc;
mod seo;

pub use definition::ToolDefinition;
pub use error::ToolError;
pub use gateway::{ToolGateway, ToolService, DEFAULT_TOOL_TIMEOUT};
pub use payload::{
	read_limited, FetchedPayload, ImageFormat, PayloadFetcher, PayloadPolicy,
	DEFAULT_EXPECTED_CONTENT_TYPE, DEFAULT_MAX_PAYLOAD_BYTES,
};
pub use result::{ToolPayload, ToolResult};
pub use rpc::RpcClient;
pub use seo::{SeoAnalysis, SeoAnalysisTool, METHOD_FROM_IMAGE, METHOD_FROM_URL, SEO_ANALYSIS_TOOL};
