//! Tool call requests emitted by the model.
//!
//! A [`ToolCall`] is what the model produces instead of a final answer when it
//! wants an external capability invoked. Providers that speak the OpenAI-style
//! wire format can convert to and from `umf::ToolCall`, whose arguments travel
//! as a JSON-encoded string.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A structured request from the model to invoke a named tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier pairing this call with its [`ToolResult`](crate::gateway::ToolResult)
    pub call_id: String,
    /// Name of the tool to invoke
    pub tool_name: String,
    /// Named arguments
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    /// Create a tool call from its parts.
    pub fn new(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: Map<String, Value>,
    ) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            arguments,
        }
    }

    /// Create a tool call from a JSON object literal.
    ///
    /// Non-object values produce an empty argument map.
    pub fn from_json(call_id: impl Into<String>, tool_name: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(call_id, tool_name, arguments)
    }

    /// Get a string argument by name.
    pub fn str_arg(&self, name: &str) -> Option<&str> {
        self.arguments.get(name).and_then(Value::as_str)
    }

    /// Convert a `umf::ToolCall` (string-encoded arguments) into a typed call.
    pub fn from_umf(call: &umf::ToolCall) -> Result<Self> {
        let arguments = if call.function.arguments.trim().is_empty() {
            Value::Object(Map::new())
        } else {
            serde_json::from_str(&call.function.arguments).with_context(|| {
                format!(
                    "Failed to parse arguments for tool call '{}' ({})",
                    call.function.name, call.id
                )
            })?
        };

        Ok(Self::from_json(call.id.clone(), call.function.name.clone(), arguments))
    }

    /// Convert into the `umf::ToolCall` wire representation.
    pub fn to_umf(&self) -> umf::ToolCall {
        umf::ToolCall {
            id: self.call_id.clone(),
            r#type: "function".to_string(),
            function: umf::FunctionCall {
                name: self.tool_name.clone(),
                arguments: Value::Object(self.arguments.clone()).to_string(),
            },
        }
    }
}

impl std::fmt::Display for ToolCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({}) [{}]",
            self.tool_name,
            Value::Object(self.arguments.clone()),
            self.call_id
        )
    }
}
