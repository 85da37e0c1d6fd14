//! JSON-RPC 2.0 over HTTP client for remote tool services.

use crate::gateway::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// JSON-RPC request structure
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
	jsonrpc: &'static str,
	id: u64,
	method: &'a str,
	params: Value,
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
	#[allow(dead_code)]
	jsonrpc: Option<String>,
	#[allow(dead_code)]
	id: Option<Value>,
	result: Option<Value>,
	error: Option<JsonRpcError>,
}

/// JSON-RPC error structure
#[derive(Debug, Deserialize)]
struct JsonRpcError {
	code: i64,
	message: String,
	#[allow(dead_code)]
	data: Option<Value>,
}

/// Client for a single JSON-RPC endpoint.
///
/// Each [`call`](RpcClient::call) is exactly one HTTP POST; there is no retry.
#[derive(Debug, Clone)]
pub struct RpcClient {
	http_client: reqwest::Client,
	endpoint: String,
	auth_token: Option<String>,
	next_id: Arc<AtomicU64>,
}

impl RpcClient {
	/// Create a client for `endpoint`.
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self::with_client(reqwest::Client::new(), endpoint)
	}

	/// Create a client sharing an existing HTTP client.
	pub fn with_client(http_client: reqwest::Client, endpoint: impl Into<String>) -> Self {
		Self {
			http_client,
			endpoint: endpoint.into(),
			auth_token: None,
			next_id: Arc::new(AtomicU64::new(1)),
		}
	}

	/// Send a bearer token with every request.
	pub fn with_auth(mut self, token: impl Into<String>) -> Self {
		self.auth_token = Some(token.into());
		self
	}

	/// Endpoint URL.
	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	/// Call `method` with `params` and return the `result` member.
	///
	/// # Errors
	/// * [`ToolError::Remote`] when the response carries an error object
	/// * [`ToolError::Transport`] for connection failures, non-success
	///   status without an error object, and unparseable bodies
	pub async fn call(&self, method: &str, params: Value) -> Result<Value, ToolError> {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let request = JsonRpcRequest {
			jsonrpc: "2.0",
			id,
			method,
			params,
		};

		let mut http_request = self.http_client.post(&self.endpoint).json(&request);
		if let Some(ref token) = self.auth_token {
			http_request = http_request.header("Authorization", format!("Bearer {}", token));
		}

		debug!(endpoint = %self.endpoint, method, id, "json-rpc request");
		let response = http_request
			.send()
			.await
			.map_err(|e| ToolError::transport(format!("{} request failed: {}", method, e)))?;

		let status = response.status();
		let body = response
			.text()
			.await
			.map_err(|e| ToolError::transport(format!("{} response read failed: {}", method, e)))?;

		let rpc_response: JsonRpcResponse = match serde_json::from_str(&body) {
			Ok(parsed) => parsed,
			Err(_) if !status.is_success() => {
				return Err(ToolError::transport(format!("{} failed: HTTP {}", method, status)));
			}
			Err(e) => {
				return Err(ToolError::transport(format!(
					"{} returned invalid JSON-RPC: {}",
					method, e
				)));
			}
		};

		if let Some(error) = rpc_response.error {
			return Err(ToolError::remote(error.code, error.message));
		}

		if !status.is_success() {
			return Err(ToolError::transport(format!("{} failed: HTTP {}", method, status)));
		}

		rpc_response
			.result
			.ok_or_else(|| ToolError::transport(format!("no result in {} response", method)))
	}
}
