//! Scripted provider and canned tools

use crate::gateway::{ToolDefinition, ToolError, ToolPayload, ToolService};
use crate::provider::{ModelProvider, StreamChunk, StreamingResponse, Transcript};
use async_trait::async_trait;
use futures_util::stream;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted model invocation.
#[derive(Debug, Clone)]
enum Script {
    Chunks(Vec<StreamChunk>),
    BrokenAfter(Vec<StreamChunk>, String),
    Unavailable(String),
    Pending,
}

/// Replays one chunk script per model invocation and records what it saw.
///
/// Scripts are consumed in the order they were pushed. Once they run out,
/// `generate_stream` fails with "script exhausted".
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    scripts: Mutex<VecDeque<Script>>,
    transcripts: Mutex<Vec<Transcript>>,
    offered_tools: Mutex<Vec<Vec<String>>>,
}

impl ScriptedProvider {
    /// Create a provider answering each invocation with the next chunk list.
    pub fn new(turns: Vec<Vec<StreamChunk>>) -> Arc<Self> {
        let provider = Self::default();
        for chunks in turns {
            provider.push_turn(chunks);
        }
        Arc::new(provider)
    }

    /// Queue a stream of chunks.
    pub fn push_turn(&self, chunks: Vec<StreamChunk>) {
        self.scripts.lock().unwrap().push_back(Script::Chunks(chunks));
    }

    /// Queue a stream that yields `chunks` and then a transport error.
    pub fn push_broken_turn(&self, chunks: Vec<StreamChunk>, message: impl Into<String>) {
        self.scripts
            .lock()
            .unwrap()
            .push_back(Script::BrokenAfter(chunks, message.into()));
    }

    /// Queue an invocation the provider refuses outright.
    pub fn push_unavailable(&self, message: impl Into<String>) {
        self.scripts
            .lock()
            .unwrap()
            .push_back(Script::Unavailable(message.into()));
    }

    /// Queue a stream that never yields.
    pub fn push_pending(&self) {
        self.scripts.lock().unwrap().push_back(Script::Pending);
    }

    /// Number of times the model was invoked.
    pub fn invocations(&self) -> usize {
        self.transcripts.lock().unwrap().len()
    }

    /// Transcripts as they were at each invocation.
    pub fn seen_transcripts(&self) -> Vec<Transcript> {
        self.transcripts.lock().unwrap().clone()
    }

    /// Tool names offered at each invocation.
    pub fn offered_tools(&self) -> Vec<Vec<String>> {
        self.offered_tools.lock().unwrap().clone()
    }

    /// Scripts not yet consumed.
    pub fn remaining(&self) -> usize {
        self.scripts.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn generate_stream(
        &self,
        transcript: &Transcript,
        tools: &[umf::Tool],
    ) -> anyhow::Result<StreamingResponse> {
        self.transcripts.lock().unwrap().push(transcript.clone());
        self.offered_tools
            .lock()
            .unwrap()
            .push(tools.iter().map(|t| t.function.name.clone()).collect());

        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("script exhausted"))?;

        match script {
            Script::Chunks(chunks) => Ok(Box::pin(stream::iter(chunks.into_iter().map(Ok)))),
            Script::BrokenAfter(chunks, message) => {
                let items: Vec<anyhow::Result<StreamChunk>> = chunks
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(anyhow::anyhow!(message))))
                    .collect();
                Ok(Box::pin(stream::iter(items)))
            }
            Script::Unavailable(message) => Err(anyhow::anyhow!(message)),
            Script::Pending => Ok(Box::pin(stream::pending())),
        }
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "script-1"
    }
}

/// Provider that can never be reached.
#[derive(Debug, Clone)]
pub struct FailingProvider {
    message: String,
}

impl FailingProvider {
    /// Create a provider failing every invocation with `message`.
    pub fn new(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            message: message.into(),
        })
    }
}

#[async_trait]
impl ModelProvider for FailingProvider {
    async fn generate_stream(
        &self,
        _transcript: &Transcript,
        _tools: &[umf::Tool],
    ) -> anyhow::Result<StreamingResponse> {
        Err(anyhow::anyhow!(self.message.clone()))
    }

    fn provider_name(&self) -> &str {
        "failing"
    }

    fn model_name(&self) -> &str {
        "none"
    }
}

/// Tool answering every call with the same outcome.
#[derive(Debug)]
pub struct StaticTool {
    definition: ToolDefinition,
    outcome: Result<ToolPayload, ToolError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_arguments: Mutex<Option<Map<String, Value>>>,
}

impl StaticTool {
    fn with_outcome(name: &str, params: &[&str], outcome: Result<ToolPayload, ToolError>) -> Self {
        let params: Vec<(&str, &str)> = params.iter().map(|p| (*p, "Required string")).collect();
        Self {
            definition: ToolDefinition::with_string_params(name, "Scripted test tool", &params),
            outcome,
            delay: None,
            calls: AtomicUsize::new(0),
            last_arguments: Mutex::new(None),
        }
    }

    /// Tool returning a text payload.
    pub fn text(name: &str, params: &[&str], text: impl Into<String>) -> Self {
        Self::with_outcome(name, params, Ok(ToolPayload::Text(text.into())))
    }

    /// Tool returning a structured payload.
    pub fn structured(name: &str, params: &[&str], value: Value) -> Self {
        Self::with_outcome(name, params, Ok(ToolPayload::Structured(value)))
    }

    /// Tool failing every call with `error`.
    pub fn failing(name: &str, params: &[&str], error: ToolError) -> Self {
        Self::with_outcome(name, params, Err(error))
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of dispatched calls.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Arguments of the most recent call.
    pub fn last_arguments(&self) -> Option<Map<String, Value>> {
        self.last_arguments.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolService for StaticTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, arguments: &Map<String, Value>) -> Result<ToolPayload, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_arguments.lock().unwrap() = Some(arguments.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone()
    }
}
