//! Conversational SEO agent backed by the orchestration loop.

use crate::gateway::{SeoAnalysis, ToolGateway, ToolPayload, ToolResult, SEO_ANALYSIS_TOOL};
use crate::observability::Logger;
use crate::orchestration::{Orchestrator, OrchestratorHandle};
use crate::provider::{ModelProvider, Transcript};
use crate::services::{ServiceError, ServiceSettings};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Service name reported by [`SeoAgentService::health`].
pub const SERVICE_NAME: &str = "SEO Analysis Agent";

/// Builds the model provider on first use.
///
/// The factory receives the service settings so it can apply the system
/// instruction, the `[llm]` section and the provider credentials.
pub type ProviderFactory =
    Arc<dyn Fn(&ServiceSettings) -> anyhow::Result<Arc<dyn ModelProvider>> + Send + Sync>;

/// Answer envelope returned by the agent.
///
/// Failures never escape as errors: they come back with `success == false`
/// and a message in `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentReply {
    /// Whether the run produced an answer
    pub success: bool,
    /// Final model text
    pub output: String,
    /// Latest successful analyzer result, if the tool was used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<SeoAnalysis>,
    /// Tool steps as "call -> result" lines
    pub intermediate_steps: Vec<String>,
    /// Failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentReply {
    fn failure(error: &ServiceError, intermediate_steps: Vec<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            analysis: None,
            intermediate_steps,
            error: Some(error.to_string()),
        }
    }
}

/// Liveness answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    /// Always "healthy" while the process serves requests
    pub status: String,
    /// Service name
    pub service: String,
}

/// SEO agent: free chat and image URL analysis through the `seo_analysis` tool.
///
/// The orchestrator is built lazily on the first request, so a missing API
/// key or endpoint surfaces as a failed reply instead of a startup error.
pub struct SeoAgentService {
    settings: ServiceSettings,
    provider_factory: ProviderFactory,
    gateway: Option<ToolGateway>,
    handle: OrchestratorHandle,
    logger: Option<Arc<Logger>>,
}

impl SeoAgentService {
    /// Create the service.
    pub fn new(settings: ServiceSettings, provider_factory: ProviderFactory) -> Self {
        Self {
            settings,
            provider_factory,
            gateway: None,
            handle: OrchestratorHandle::new(),
            logger: None,
        }
    }

    /// Use `gateway` instead of the one described by the settings.
    pub fn with_gateway(mut self, gateway: ToolGateway) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Record sessions in a markdown log.
    pub fn with_logger(mut self, logger: Arc<Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Whether the orchestrator has been built.
    pub fn is_initialized(&self) -> bool {
        self.handle.is_initialized()
    }

    /// Liveness check.
    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
        }
    }

    /// Answer a free-form message.
    pub async fn chat(&self, message: &str) -> AgentReply {
        if message.trim().is_empty() {
            return AgentReply::failure(&ServiceError::missing_input("message"), Vec::new());
        }
        self.execute("chat", message.to_string()).await
    }

    /// Analyze an image URL for SEO.
    pub async fn analyze_image_seo(&self, image_url: &str) -> AgentReply {
        let image_url = image_url.trim();
        if image_url.is_empty() {
            return AgentReply::failure(&ServiceError::missing_input("image_url"), Vec::new());
        }
        self.execute(
            "seo",
            format!("Please analyze this image URL for SEO purposes: {}", image_url),
        )
        .await
    }

    async fn orchestrator(&self) -> Result<Arc<Orchestrator>, ServiceError> {
        self.handle
            .get_or_try_init(|| async {
                let provider = (self.provider_factory)(&self.settings)?;
                let gateway = match &self.gateway {
                    Some(gateway) => gateway.clone(),
                    None => self.settings.build_gateway()?,
                };
                Ok(Orchestrator::with_config(
                    provider,
                    Arc::new(gateway),
                    self.settings.runtime_config(),
                ))
            })
            .await
            .map_err(|e| ServiceError::initialization(&e))
    }

    async fn execute(&self, mode: &str, input: String) -> AgentReply {
        let started = Instant::now();
        self.log(|logger| {
            let mut session = HashMap::new();
            session.insert("input".to_string(), serde_json::json!(input));
            logger.log_session_start(mode, &session)
        });

        let orchestrator = match self.orchestrator().await {
            Ok(orchestrator) => orchestrator,
            Err(e) => {
                self.log(|logger| logger.log_error(&e.to_string(), None));
                return AgentReply::failure(&e, Vec::new());
            }
        };

        let reply = match orchestrator.run(&input, None).await {
            Ok(run) => {
                self.log_run(&run.transcript, &run.tool_results);
                AgentReply {
                    success: true,
                    output: run.output.as_text(),
                    analysis: latest_analysis(&run.tool_results),
                    intermediate_steps: run.transcript.intermediate_steps(),
                    error: None,
                }
            }
            Err(failure) => {
                let steps = failure
                    .transcript
                    .as_ref()
                    .map(Transcript::intermediate_steps)
                    .unwrap_or_default();
                let error = ServiceError::from(failure);
                self.log(|logger| logger.log_error(&error.to_string(), None));
                AgentReply::failure(&error, steps)
            }
        };

        self.log(|logger| {
            let mut sizes = HashMap::new();
            sizes.insert("input_chars".to_string(), input.chars().count() as u64);
            sizes.insert("output_chars".to_string(), reply.output.chars().count() as u64);
            sizes.insert("steps".to_string(), reply.intermediate_steps.len() as u64);
            logger.log_api_call(mode, started.elapsed(), reply.success, &sizes)?;
            logger.log_completion(if reply.success { "answered" } else { "failed" })
        });
        reply
    }

    fn log_run(&self, transcript: &Transcript, tool_results: &[ToolResult]) {
        self.log(|logger| {
            for turn in transcript.turns() {
                logger.log_turn(turn.turn_index, turn.role.as_str(), &turn.content.summary())?;
            }
            let calls = transcript.turns().iter().filter_map(|t| t.tool_call.as_ref());
            for (call, result) in calls.zip(tool_results) {
                let args = serde_json::to_string(&call.arguments).unwrap_or_default();
                logger.log_tool_invocation(&call.tool_name, &args, &result.render(), result.is_success())?;
            }
            Ok(())
        });
    }

    fn log<F>(&self, write: F)
    where
        F: FnOnce(&Logger) -> anyhow::Result<()>,
    {
        if let Some(logger) = &self.logger {
            if let Err(e) = write(logger) {
                warn!(error = %format!("{e:#}"), "failed to write session log");
            }
        }
    }
}

fn latest_analysis(results: &[ToolResult]) -> Option<SeoAnalysis> {
    results
        .iter()
        .rev()
        .filter(|r| r.is_success() && r.tool_name == SEO_ANALYSIS_TOOL)
        .find_map(|r| match &r.payload {
            ToolPayload::Structured(value) => serde_json::from_value(value.clone()).ok(),
            _ => None,
        })
}
