//! Declarations of the tools a model may call.

use crate::gateway::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A tool as advertised to the model.
///
/// # Example
///
/// ```
/// use stox_agent::gateway::ToolDefinition;
/// use serde_json::json;
///
/// let def = ToolDefinition::new(
///     "seo_analysis",
///     "Analyze the SEO of a single image URL",
///     json!({
///         "type": "object",
///         "properties": {
///             "url": { "type": "string", "description": "Absolute image URL" }
///         },
///         "required": ["url"]
///     }),
/// );
///
/// assert_eq!(def.required_parameters(), vec!["url"]);
/// assert_eq!(def.to_umf_tool().function.name, "seo_analysis");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
	/// Unique tool name, matched against [`ToolCall::tool_name`](crate::provider::ToolCall).
	pub name: String,

	/// Human-readable description for the model.
	pub description: String,

	/// JSON Schema of the arguments object.
	pub parameters: Value,
}

impl ToolDefinition {
	/// Create a new tool definition.
	pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
		Self {
			name: name.into(),
			description: description.into(),
			parameters,
		}
	}

	/// Create a definition whose parameters are all required strings.
	///
	/// Each entry is `(name, description)`.
	pub fn with_string_params(
		name: impl Into<String>,
		description: impl Into<String>,
		params: &[(&str, &str)],
	) -> Self {
		let properties: Map<String, Value> = params
			.iter()
			.map(|(param, desc)| {
				(
					param.to_string(),
					json!({ "type": "string", "description": desc }),
				)
			})
			.collect();
		let required: Vec<&str> = params.iter().map(|(param, _)| *param).collect();

		Self::new(
			name,
			description,
			json!({
				"type": "object",
				"properties": properties,
				"required": required,
			}),
		)
	}

	/// Names listed in the schema's `required` array.
	pub fn required_parameters(&self) -> Vec<&str> {
		self.parameters
			.get("required")
			.and_then(Value::as_array)
			.map(|names| names.iter().filter_map(Value::as_str).collect())
			.unwrap_or_default()
	}

	/// Check that every required parameter is present and non-null.
	///
	/// String parameters must also be non-blank.
	pub fn validate_arguments(&self, arguments: &Map<String, Value>) -> Result<(), ToolError> {
		let missing: Vec<&str> = self
			.required_parameters()
			.into_iter()
			.filter(|param| match arguments.get(*param) {
				None | Some(Value::Null) => true,
				Some(Value::String(s)) => s.trim().is_empty(),
				Some(_) => false,
			})
			.collect();

		if missing.is_empty() {
			Ok(())
		} else {
			Err(ToolError::invalid_arguments(
				&self.name,
				format!("missing required parameter(s): {}", missing.join(", ")),
			))
		}
	}

	/// Convert into the declaration handed to the model provider.
	pub fn to_umf_tool(&self) -> umf::Tool {
		umf::Tool {
			r#type: "function".to_string(),
			function: umf::Function {
				name: self.name.clone(),
				description: self.description.clone(),
				parameters: self.parameters.clone(),
			},
		}
	}
}
