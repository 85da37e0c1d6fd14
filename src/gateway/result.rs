//! Outcome of a single tool invocation.

use crate::gateway::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a tool produced on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ToolPayload {
	/// Plain text
	Text(String),
	/// Structured JSON value
	Structured(Value),
	/// Nothing to report
	None,
}

impl ToolPayload {
	/// Text rendering fed back to the model.
	pub fn render(&self) -> String {
		match self {
			Self::Text(text) => text.clone(),
			Self::Structured(value) => value.to_string(),
			Self::None => String::new(),
		}
	}
}

/// Result paired with the [`ToolCall`](crate::provider::ToolCall) that produced it.
///
/// Exactly one of `payload` (meaningful) and `error` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
	/// Id of the originating call
	pub call_id: String,
	/// Name of the invoked tool
	pub tool_name: String,
	/// Payload on success, [`ToolPayload::None`] on failure
	pub payload: ToolPayload,
	/// Normalized failure
	pub error: Option<ToolError>,
}

impl ToolResult {
	/// Successful result.
	pub fn success(call_id: impl Into<String>, tool_name: impl Into<String>, payload: ToolPayload) -> Self {
		Self {
			call_id: call_id.into(),
			tool_name: tool_name.into(),
			payload,
			error: None,
		}
	}

	/// Failed result.
	pub fn failure(call_id: impl Into<String>, tool_name: impl Into<String>, error: ToolError) -> Self {
		Self {
			call_id: call_id.into(),
			tool_name: tool_name.into(),
			payload: ToolPayload::None,
			error: Some(error),
		}
	}

	/// Whether the invocation succeeded.
	pub fn is_success(&self) -> bool {
		self.error.is_none()
	}

	/// Text placed in the synthetic tool turn.
	///
	/// Failures render as `Error [kind]: message` so the model can react.
	pub fn render(&self) -> String {
		match &self.error {
			Some(error) => format!("Error [{}]: {}", error.kind(), error),
			None => self.payload.render(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_render_structured_success() {
		let result = ToolResult::success(
			"c1",
			"seo_analysis",
			ToolPayload::Structured(json!({"title": "Mug"})),
		);
		assert!(result.is_success());
		assert_eq!(result.render(), r#"{"title":"Mug"}"#);
	}

	#[test]
	fn test_render_failure_carries_kind() {
		let result = ToolResult::failure("c1", "seo_analysis", ToolError::payload_too_large(10, Some(20)));
		assert!(!result.is_success());
		assert_eq!(result.payload, ToolPayload::None);
		assert!(result.render().starts_with("Error [payload_too_large]:"));
	}

	#[test]
	fn test_payload_serialization() {
		let json = serde_json::to_value(ToolPayload::Text("ok".into())).unwrap();
		assert_eq!(json, json!({"type": "text", "value": "ok"}));
	}
}
