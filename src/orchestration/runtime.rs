//! Orchestration loop - bounded model/tool round-trips for one request

use crate::extraction::{ExtractedResult, FieldSchema, StructuredExtractor};
use crate::gateway::{ToolGateway, ToolResult};
use crate::orchestration::{OrchestrationError, RunFailure, ToolCoordinator};
use crate::provider::{ModelProvider, Transcript};
use crate::stream::{BinaryPayload, StreamMultiplexer, StreamOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default maximum number of tool round-trips per run.
pub const DEFAULT_MAX_ROUND_TRIPS: u32 = 5;

/// Orchestration runtime configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// Tool round-trips allowed before the run is closed with a degraded answer
    pub max_round_trips: u32,
    /// Budget for each tool call; the gateway default when `None`
    pub tool_timeout: Option<Duration>,
    /// Budget for the whole run
    pub run_timeout: Option<Duration>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_round_trips: DEFAULT_MAX_ROUND_TRIPS,
            tool_timeout: None,
            run_timeout: None,
        }
    }
}

/// Run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Not yet started
    Start,
    /// Waiting on the model stream
    AwaitingModel,
    /// Waiting on a tool result
    AwaitingTool,
    /// Final answer received, post-processing
    Final,
    /// Finished
    Done,
}

/// What the run produced
#[derive(Debug, Clone, PartialEq)]
pub enum FinalOutput {
    /// Raw model text (no schema requested)
    Text(String),
    /// Fields recovered from the model text
    Extracted(ExtractedResult),
    /// Round-trip cap reached; explanatory message
    Exhausted(String),
}

impl FinalOutput {
    /// Text rendering of the output.
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(text) | Self::Exhausted(text) => text.clone(),
            Self::Extracted(result) => serde_json::to_string(&result.fields).unwrap_or_default(),
        }
    }

    /// Whether the run was closed by the round-trip cap.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted(_))
    }
}

/// Successful run result
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Final output
    pub output: FinalOutput,
    /// Complete transcript, user turn first
    pub transcript: Transcript,
    /// Binary payload of the final answer, if the model streamed one
    pub payload: Option<BinaryPayload>,
    /// Tool results in invocation order
    pub tool_results: Vec<ToolResult>,
}

impl RunOutput {
    /// Number of tool round-trips performed.
    pub fn round_trips(&self) -> usize {
        self.tool_results.len()
    }
}

/// Drives the model/tool conversation for one request at a time.
///
/// Runs are independent; the orchestrator only shares the provider and the
/// gateway, both immutable, so one instance can serve concurrent runs.
pub struct Orchestrator {
    provider: Arc<dyn ModelProvider>,
    gateway: Arc<ToolGateway>,
    config: RuntimeConfig,
}

impl Orchestrator {
    /// Create an orchestrator with default configuration
    pub fn new(provider: Arc<dyn ModelProvider>, gateway: Arc<ToolGateway>) -> Self {
        Self::with_config(provider, gateway, RuntimeConfig::default())
    }

    /// Create an orchestrator with custom configuration
    pub fn with_config(
        provider: Arc<dyn ModelProvider>,
        gateway: Arc<ToolGateway>,
        config: RuntimeConfig,
    ) -> Self {
        Self {
            provider,
            gateway,
            config,
        }
    }

    /// Runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Tool gateway
    pub fn gateway(&self) -> &ToolGateway {
        &self.gateway
    }

    /// Model provider
    pub fn provider(&self) -> &dyn ModelProvider {
        self.provider.as_ref()
    }

    /// Run from a single user text turn.
    pub async fn run(
        &self,
        user_input: &str,
        schema: Option<&FieldSchema>,
    ) -> Result<RunOutput, RunFailure> {
        self.run_transcript(Transcript::from_user(user_input), schema, CancellationToken::new())
            .await
    }

    /// Run from a single user text turn, observing `cancel`.
    pub async fn run_with_cancel(
        &self,
        user_input: &str,
        schema: Option<&FieldSchema>,
        cancel: CancellationToken,
    ) -> Result<RunOutput, RunFailure> {
        self.run_transcript(Transcript::from_user(user_input), schema, cancel)
            .await
    }

    /// Run from a pre-seeded transcript (e.g. a prompt plus an image).
    ///
    /// The loop:
    /// 1. Invoke the model with the transcript and tool declarations
    /// 2. Drain the stream
    /// 3. On a tool call, invoke it, append the tool turn and go to 1,
    ///    unless the round-trip cap is reached
    /// 4. On a final answer, append the assistant turn and extract fields
    ///    when a schema is given
    pub async fn run_transcript(
        &self,
        transcript: Transcript,
        schema: Option<&FieldSchema>,
        cancel: CancellationToken,
    ) -> Result<RunOutput, RunFailure> {
        let deadline = self.config.run_timeout.map(|limit| Instant::now() + limit);
        self.drive(transcript, schema, cancel, deadline).await
    }

    fn timed_out(&self, state: RunState) -> RunFailure {
        let after_ms = self.config.run_timeout.map_or(0, |limit| limit.as_millis() as u64);
        warn!(after_ms, ?state, "run timed out");
        RunFailure::discarded(OrchestrationError::TimedOut { after_ms }, state)
    }

    async fn drive(
        &self,
        mut transcript: Transcript,
        schema: Option<&FieldSchema>,
        cancel: CancellationToken,
        deadline: Option<Instant>,
    ) -> Result<RunOutput, RunFailure> {
        let extractor = match schema {
            Some(schema) => Some(StructuredExtractor::new(schema.clone()).map_err(|e| {
                RunFailure::new(e.into(), RunState::Start, transcript.clone())
            })?),
            None => None,
        };

        let tools = self.gateway.umf_tools();
        let multiplexer = StreamMultiplexer::with_cancellation(cancel.clone());
        let mut coordinator = ToolCoordinator::new(self.gateway.clone(), self.config.tool_timeout);
        let cap = self.config.max_round_trips as usize;
        let mut state = RunState::Start;

        info!(
            provider = self.provider.provider_name(),
            model = self.provider.model_name(),
            tools = tools.len(),
            cap,
            ?state,
            "run started"
        );

        let accumulator = loop {
            state = RunState::AwaitingModel;
            debug!(?state, turns = transcript.len(), "invoking model");

            let started = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(RunFailure::discarded(OrchestrationError::Cancelled, state));
                }
                _ = expired(deadline) => return Err(self.timed_out(state)),
                started = self.provider.generate_stream(&transcript, &tools) => started,
            };
            let stream = started.map_err(|e| {
                warn!(error = %format!("{e:#}"), "model unavailable");
                RunFailure::new(
                    OrchestrationError::model_unavailable(self.provider.provider_name(), &e),
                    state,
                    transcript.clone(),
                )
            })?;

            let consumed = tokio::select! {
                biased;
                _ = expired(deadline) => return Err(self.timed_out(state)),
                consumed = multiplexer.consume(stream) => consumed,
            };
            let outcome = consumed.map_err(|e| {
                RunFailure::new(
                    OrchestrationError::from_stream(self.provider.provider_name(), e),
                    state,
                    transcript.clone(),
                )
            })?;

            match outcome {
                StreamOutcome::Complete(accumulator) => break accumulator,
                StreamOutcome::ToolRequested(call) => {
                    if coordinator.invocation_count() >= cap {
                        let message = format!(
                            "Stopped after {} tool round-trips without a final answer; the last request was {}.",
                            cap, call.tool_name
                        );
                        warn!(cap, tool = %call.tool_name, "round-trip cap reached");
                        transcript.push_assistant(message.clone());
                        info!(round_trips = cap, turns = transcript.len(), "run finished degraded");
                        return Ok(RunOutput {
                            output: FinalOutput::Exhausted(message),
                            transcript,
                            payload: None,
                            tool_results: coordinator.into_history(),
                        });
                    }

                    state = RunState::AwaitingTool;
                    debug!(?state, tool = %call.tool_name, call_id = %call.call_id, "invoking tool");
                    let rendered = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            return Err(RunFailure::discarded(OrchestrationError::Cancelled, state));
                        }
                        _ = expired(deadline) => return Err(self.timed_out(state)),
                        result = coordinator.execute(&call) => result.render(),
                    };
                    transcript.push_tool(call, rendered);
                }
            }
        };

        state = RunState::Final;
        let (text, payload) = accumulator.finish();
        match &payload {
            Some(binary) if text.is_empty() => {
                let mime = binary.mime_type.clone().unwrap_or_else(|| "application/octet-stream".to_string());
                transcript.push_assistant_binary(binary.data.clone(), mime);
            }
            _ => {
                transcript.push_assistant(text.clone());
            }
        }

        let output = match &extractor {
            Some(extractor) => match extractor.extract(&text) {
                Ok(result) => {
                    debug!(confidence = %result.confidence, "fields extracted");
                    FinalOutput::Extracted(result)
                }
                Err(e) => {
                    warn!(error = %e, "extraction failed");
                    return Err(RunFailure::new(e.into(), state, transcript));
                }
            },
            None => FinalOutput::Text(text),
        };

        state = RunState::Done;
        info!(
            ?state,
            round_trips = coordinator.invocation_count(),
            turns = transcript.len(),
            binary = payload.is_some(),
            "run finished"
        );

        Ok(RunOutput {
            output,
            transcript,
            payload,
            tool_results: coordinator.into_history(),
        })
    }
}

/// Resolves once `deadline` has passed; never when there is none.
async fn expired(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
