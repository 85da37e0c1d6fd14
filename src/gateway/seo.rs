//! The `seo_analysis` tool backed by the product image analyzer service.

use crate::gateway::{PayloadFetcher, RpcClient, ToolDefinition, ToolError, ToolPayload, ToolService};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Name the model uses to request SEO analysis.
pub const SEO_ANALYSIS_TOOL: &str = "seo_analysis";

/// Remote method taking an image URL.
pub const METHOD_FROM_URL: &str = "GenerateFromImageUrl";

/// Remote method taking inline base64 image bytes.
pub const METHOD_FROM_IMAGE: &str = "GenerateFromImage";

/// Title and description returned by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoAnalysis {
	/// SEO product title
	pub title: String,
	/// SEO product description
	pub description: String,
}

/// Analyzes the product in an image URL for SEO.
///
/// By default the URL is forwarded and the analyzer downloads it. With
/// [`with_prefetch`](SeoAnalysisTool::with_prefetch) the image is
/// downloaded here under a [`PayloadPolicy`](crate::gateway::PayloadPolicy)
/// and sent inline, so oversized or non-image URLs fail before the remote call.
#[derive(Debug, Clone)]
pub struct SeoAnalysisTool {
	definition: ToolDefinition,
	rpc: RpcClient,
	fetcher: Option<PayloadFetcher>,
}

impl SeoAnalysisTool {
	/// Create the tool for an analyzer endpoint.
	pub fn new(rpc: RpcClient) -> Self {
		Self {
			definition: ToolDefinition::with_string_params(
				SEO_ANALYSIS_TOOL,
				"Analyze the SEO of a single image URL and return a short report.",
				&[("url", "Absolute URL of the image to be analyzed")],
			),
			rpc,
			fetcher: None,
		}
	}

	/// Download and validate the image before calling the analyzer.
	pub fn with_prefetch(mut self, fetcher: PayloadFetcher) -> Self {
		self.fetcher = Some(fetcher);
		self
	}

	async fn analyze(&self, url: &str) -> Result<SeoAnalysis, ToolError> {
		let result = match &self.fetcher {
			Some(fetcher) => {
				let fetched = fetcher.fetch(url).await?;
				let params = json!({
					"image": STANDARD.encode(&fetched.data),
					"content_type": fetched.format.mime_type(),
					"filename": fetched.filename_for(url),
				});
				self.rpc.call(METHOD_FROM_IMAGE, params).await?
			}
			None => self.rpc.call(METHOD_FROM_URL, json!({ "image_url": url })).await?,
		};

		parse_analysis(result)
	}
}

fn parse_analysis(result: Value) -> Result<SeoAnalysis, ToolError> {
	let analysis: SeoAnalysis = serde_json::from_value(result)
		.map_err(|e| ToolError::malformed(format!("analyzer response: {}", e)))?;
	if analysis.title.trim().is_empty() || analysis.description.trim().is_empty() {
		return Err(ToolError::malformed("analyzer response has an empty title or description"));
	}
	Ok(analysis)
}

#[async_trait]
impl ToolService for SeoAnalysisTool {
	fn definition(&self) -> &ToolDefinition {
		&self.definition
	}

	async fn call(&self, arguments: &Map<String, Value>) -> Result<ToolPayload, ToolError> {
		let url = arguments
			.get("url")
			.and_then(Value::as_str)
			.ok_or_else(|| ToolError::invalid_arguments(SEO_ANALYSIS_TOOL, "url must be a string"))?;

		let analysis = self.analyze(url.trim()).await?;
		Ok(ToolPayload::Structured(json!({
			"title": analysis.title,
			"description": analysis.description,
		})))
	}
}
