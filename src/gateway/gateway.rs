//! Tool registry and single-shot dispatcher.

use crate::gateway::{ToolDefinition, ToolError, ToolPayload, ToolResult};
use crate::provider::ToolCall;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Default budget for one tool invocation.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// An external capability the model can invoke.
///
/// Implementations perform exactly one outbound call per [`call`](ToolService::call)
/// and never retry internally. Arguments have already been validated against
/// [`definition`](ToolService::definition) when `call` runs.
#[async_trait]
pub trait ToolService: Send + Sync {
	/// Declaration advertised to the model.
	fn definition(&self) -> &ToolDefinition;

	/// Perform the call.
	async fn call(&self, arguments: &Map<String, Value>) -> Result<ToolPayload, ToolError>;
}

/// Dispatches [`ToolCall`]s to registered [`ToolService`]s.
///
/// [`invoke`](ToolGateway::invoke) never fails: validation errors, timeouts
/// and service errors all come back inside the [`ToolResult`].
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use stox_agent::gateway::{RpcClient, SeoAnalysisTool, ToolGateway};
///
/// let mut gateway = ToolGateway::new();
/// gateway.register(Arc::new(SeoAnalysisTool::new(RpcClient::new("http://localhost:50071/rpc"))))?;
/// assert!(gateway.contains("seo_analysis"));
/// ```
#[derive(Clone)]
pub struct ToolGateway {
	tools: HashMap<String, Arc<dyn ToolService>>,
	default_timeout: Duration,
}

impl Default for ToolGateway {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for ToolGateway {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ToolGateway")
			.field("tools", &self.names())
			.field("default_timeout", &self.default_timeout)
			.finish()
	}
}

impl ToolGateway {
	/// Create an empty gateway with the default timeout.
	pub fn new() -> Self {
		Self {
			tools: HashMap::new(),
			default_timeout: DEFAULT_TOOL_TIMEOUT,
		}
	}

	/// Set the timeout used when a call passes none.
	pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
		self.default_timeout = timeout;
		self
	}

	/// Timeout used when a call passes none.
	pub fn default_timeout(&self) -> Duration {
		self.default_timeout
	}

	/// Register a tool.
	///
	/// Returns an error if a tool with the same name already exists.
	pub fn register(&mut self, tool: Arc<dyn ToolService>) -> Result<(), ToolError> {
		let name = tool.definition().name.clone();
		if self.tools.contains_key(&name) {
			return Err(ToolError::duplicate_name(name));
		}
		self.tools.insert(name, tool);
		Ok(())
	}

	/// Register a tool, replacing any existing one with the same name.
	pub fn register_or_replace(&mut self, tool: Arc<dyn ToolService>) -> Option<Arc<dyn ToolService>> {
		self.tools.insert(tool.definition().name.clone(), tool)
	}

	/// Check if a tool exists.
	pub fn contains(&self, name: &str) -> bool {
		self.tools.contains_key(name)
	}

	/// Number of registered tools.
	pub fn len(&self) -> usize {
		self.tools.len()
	}

	/// Check if no tools are registered.
	pub fn is_empty(&self) -> bool {
		self.tools.is_empty()
	}

	/// Registered tool names, sorted.
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}

	/// Tool declarations for the model, sorted by name.
	pub fn umf_tools(&self) -> Vec<umf::Tool> {
		self.names()
			.into_iter()
			.filter_map(|name| self.tools.get(name))
			.map(|tool| tool.definition().to_umf_tool())
			.collect()
	}

	/// Invoke the tool named by `call`.
	///
	/// # Arguments
	/// * `call` - Request emitted by the model
	/// * `timeout` - Budget for this call; the gateway default when `None`
	pub async fn invoke(&self, call: &ToolCall, timeout: Option<Duration>) -> ToolResult {
		let Some(tool) = self.tools.get(&call.tool_name) else {
			warn!(tool = %call.tool_name, call_id = %call.call_id, "unknown tool requested");
			return ToolResult::failure(&call.call_id, &call.tool_name, ToolError::not_found(&call.tool_name));
		};

		if let Err(error) = tool.definition().validate_arguments(&call.arguments) {
			warn!(tool = %call.tool_name, call_id = %call.call_id, %error, "tool arguments rejected");
			return ToolResult::failure(&call.call_id, &call.tool_name, error);
		}

		let budget = timeout.unwrap_or(self.default_timeout);
		let started = Instant::now();
		let outcome = tokio::time::timeout(budget, tool.call(&call.arguments)).await;
		let elapsed_ms = started.elapsed().as_millis() as u64;

		match outcome {
			Ok(Ok(payload)) => {
				info!(tool = %call.tool_name, call_id = %call.call_id, elapsed_ms, "tool succeeded");
				ToolResult::success(&call.call_id, &call.tool_name, payload)
			}
			Ok(Err(error)) => {
				warn!(tool = %call.tool_name, call_id = %call.call_id, elapsed_ms, kind = error.kind(), %error, "tool failed");
				ToolResult::failure(&call.call_id, &call.tool_name, error)
			}
			Err(_) => {
				let error = ToolError::timeout(&call.tool_name, budget.as_millis() as u64);
				warn!(tool = %call.tool_name, call_id = %call.call_id, %error, "tool timed out");
				ToolResult::failure(&call.call_id, &call.tool_name, error)
			}
		}
	}

	/// Invoke a tool by name, generating a call id.
	pub async fn invoke_named(
		&self,
		tool_name: &str,
		arguments: Map<String, Value>,
		timeout: Option<Duration>,
	) -> ToolResult {
		let call = ToolCall::new(uuid::Uuid::new_v4().to_string(), tool_name, arguments);
		self.invoke(&call, timeout).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use std::sync::atomic::{AtomicUsize, Ordering};

	struct EchoTool {
		definition: ToolDefinition,
		calls: AtomicUsize,
		delay: Option<Duration>,
	}

	impl EchoTool {
		fn new(name: &str) -> Self {
			Self {
				definition: ToolDefinition::with_string_params(name, "Echo the url", &[("url", "Any url")]),
				calls: AtomicUsize::new(0),
				delay: None,
			}
		}

		fn slow(name: &str, delay: Duration) -> Self {
			Self {
				delay: Some(delay),
				..Self::new(name)
			}
		}
	}

	#[async_trait]
	impl ToolService for EchoTool {
		fn definition(&self) -> &ToolDefinition {
			&self.definition
		}

		async fn call(&self, arguments: &Map<String, Value>) -> Result<ToolPayload, ToolError> {
			self.calls.fetch_add(1, Ordering::SeqCst);
			if let Some(delay) = self.delay {
				tokio::time::sleep(delay).await;
			}
			Ok(ToolPayload::Text(arguments["url"].as_str().unwrap_or_default().to_string()))
		}
	}

	fn call(name: &str, args: Value) -> ToolCall {
		ToolCall::from_json("call-1", name, args)
	}

	#[tokio::test]
	async fn test_invoke_success() {
		let mut gateway = ToolGateway::new();
		gateway.register(Arc::new(EchoTool::new("echo"))).unwrap();

		let result = gateway.invoke(&call("echo", json!({"url": "http://a/b.png"})), None).await;
		assert!(result.is_success());
		assert_eq!(result.call_id, "call-1");
		assert_eq!(result.payload, ToolPayload::Text("http://a/b.png".into()));
	}

	#[tokio::test]
	async fn test_unknown_tool_is_normalized() {
		let gateway = ToolGateway::new();
		let result = gateway.invoke(&call("missing", json!({})), None).await;
		assert_eq!(result.error, Some(ToolError::not_found("missing")));
	}

	#[tokio::test]
	async fn test_invalid_arguments_skip_dispatch() {
		let tool = Arc::new(EchoTool::new("echo"));
		let mut gateway = ToolGateway::new();
		gateway.register(tool.clone()).unwrap();

		let result = gateway.invoke(&call("echo", json!({"other": 1})), None).await;
		assert!(matches!(result.error, Some(ToolError::InvalidArguments { .. })));
		assert_eq!(tool.calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test(start_paused = true)]
	async fn test_timeout_is_normalized() {
		let mut gateway = ToolGateway::new();
		gateway
			.register(Arc::new(EchoTool::slow("slow", Duration::from_secs(60))))
			.unwrap();

		let result = gateway
			.invoke(&call("slow", json!({"url": "x"})), Some(Duration::from_millis(250)))
			.await;
		assert_eq!(result.error, Some(ToolError::timeout("slow", 250)));
	}

	#[test]
	fn test_register_duplicate() {
		let mut gateway = ToolGateway::new();
		gateway.register(Arc::new(EchoTool::new("echo"))).unwrap();
		let err = gateway.register(Arc::new(EchoTool::new("echo"))).unwrap_err();
		assert_eq!(err, ToolError::duplicate_name("echo"));

		assert!(gateway.register_or_replace(Arc::new(EchoTool::new("echo"))).is_some());
		assert_eq!(gateway.len(), 1);
	}

	#[test]
	fn test_umf_tools_sorted() {
		let mut gateway = ToolGateway::new();
		gateway.register(Arc::new(EchoTool::new("zeta"))).unwrap();
		gateway.register(Arc::new(EchoTool::new("alpha"))).unwrap();

		let names: Vec<String> = gateway.umf_tools().into_iter().map(|t| t.function.name).collect();
		assert_eq!(names, vec!["alpha", "zeta"]);
	}

	#[tokio::test]
	async fn test_invoke_named_generates_call_id() {
		let mut gateway = ToolGateway::new();
		gateway.register(Arc::new(EchoTool::new("echo"))).unwrap();

		let mut args = Map::new();
		args.insert("url".into(), json!("u"));
		let result = gateway.invoke_named("echo", args, None).await;
		assert!(result.is_success());
		assert_eq!(result.call_id.len(), 36);
	}
}
