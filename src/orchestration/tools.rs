//! Tool invocation coordination for a single run

use crate::gateway::{ToolGateway, ToolResult};
use crate::provider::ToolCall;
use std::sync::Arc;
use std::time::Duration;

/// Tool coordinator
///
/// Dispatches the calls of one run through the shared gateway and keeps
/// the results in order. One coordinator per run.
pub struct ToolCoordinator {
    gateway: Arc<ToolGateway>,
    timeout: Option<Duration>,
    execution_history: Vec<ToolResult>,
}

impl ToolCoordinator {
    /// Create a coordinator over `gateway`
    pub fn new(gateway: Arc<ToolGateway>, timeout: Option<Duration>) -> Self {
        Self {
            gateway,
            timeout,
            execution_history: Vec::new(),
        }
    }

    /// Invoke `call` and record the result
    pub async fn execute(&mut self, call: &ToolCall) -> &ToolResult {
        let result = self.gateway.invoke(call, self.timeout).await;
        self.execution_history.push(result);
        let last = self.execution_history.len() - 1;
        &self.execution_history[last]
    }

    /// Get total number of tool invocations (round-trips so far)
    pub fn invocation_count(&self) -> usize {
        self.execution_history.len()
    }

    /// Get execution history
    pub fn execution_history(&self) -> &[ToolResult] {
        &self.execution_history
    }

    /// Get successful executions
    pub fn successful_executions(&self) -> Vec<&ToolResult> {
        self.execution_history.iter().filter(|r| r.is_success()).collect()
    }

    /// Get failed executions
    pub fn failed_executions(&self) -> Vec<&ToolResult> {
        self.execution_history.iter().filter(|r| !r.is_success()).collect()
    }

    /// Consume the coordinator, returning the history
    pub fn into_history(self) -> Vec<ToolResult> {
        self.execution_history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{ToolDefinition, ToolError, ToolPayload, ToolService};
    use async_trait::async_trait;
    use serde_json::{json, Map, Value};

    struct Upper(ToolDefinition);

    #[async_trait]
    impl ToolService for Upper {
        fn definition(&self) -> &ToolDefinition {
            &self.0
        }

        async fn call(&self, arguments: &Map<String, Value>) -> Result<ToolPayload, ToolError> {
            let text = arguments["text"].as_str().unwrap_or_default();
            Ok(ToolPayload::Text(text.to_uppercase()))
        }
    }

    #[tokio::test]
    async fn test_tool_coordinator() {
        let mut gateway = ToolGateway::new();
        gateway
            .register(Arc::new(Upper(ToolDefinition::with_string_params("upper", "Uppercase", &[("text", "Input")]))))
            .unwrap();
        let mut coordinator = ToolCoordinator::new(Arc::new(gateway), None);

        assert_eq!(coordinator.invocation_count(), 0);
        assert!(coordinator.execution_history().is_empty());

        let ok = coordinator
            .execute(&ToolCall::from_json("call_1", "upper", json!({"text": "abc"})))
            .await;
        assert_eq!(ok.render(), "ABC");

        let failed = coordinator
            .execute(&ToolCall::from_json("call_2", "missing", json!({})))
            .await;
        assert!(!failed.is_success());

        assert_eq!(coordinator.invocation_count(), 2);
        assert_eq!(coordinator.successful_executions().len(), 1);
        assert_eq!(coordinator.failed_executions().len(), 1);
        assert_eq!(coordinator.into_history()[1].call_id, "call_2");
    }
}
