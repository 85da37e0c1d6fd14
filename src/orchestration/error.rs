//! Error types for orchestration runs.

use crate::extraction::ExtractionError;
use crate::orchestration::RunState;
use crate::provider::Transcript;
use crate::stream::StreamError;
use thiserror::Error;

/// Reasons a run terminates without a final answer.
///
/// Tool failures are not listed: they are fed back to the model as tool turns.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrchestrationError {
    /// The provider could not start a stream, or its stream broke mid-way.
    #[error("model unavailable ({provider}): {message}")]
    ModelUnavailable {
        /// Provider name
        provider: String,
        /// Error chain of the failed call
        message: String,
    },

    /// The model stream produced nothing.
    #[error("model returned an empty stream")]
    EmptyStream,

    /// The final answer did not contain the requested fields.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The caller cancelled the run.
    #[error("run cancelled")]
    Cancelled,

    /// The run exceeded its time budget.
    #[error("run timed out after {after_ms}ms")]
    TimedOut {
        /// Configured budget in milliseconds
        after_ms: u64,
    },
}

impl OrchestrationError {
    /// Create a ModelUnavailable error from a provider failure.
    pub fn model_unavailable(provider: impl Into<String>, error: &anyhow::Error) -> Self {
        Self::ModelUnavailable {
            provider: provider.into(),
            message: format!("{error:#}"),
        }
    }

    /// Map a stream failure of `provider`'s response.
    ///
    /// A broken transport means the model became unreachable, so it is
    /// reported as `ModelUnavailable` with the chunk count in the message.
    pub fn from_stream(provider: impl Into<String>, error: StreamError) -> Self {
        match error {
            StreamError::Empty => Self::EmptyStream,
            StreamError::Cancelled => Self::Cancelled,
            transport @ StreamError::Transport { .. } => Self::ModelUnavailable {
                provider: provider.into(),
                message: transport.to_string(),
            },
        }
    }
}

/// A terminated run.
///
/// `transcript` holds the turns recorded up to the failure. It is `None`
/// when the run was cancelled or timed out, which discards partial state.
#[derive(Debug, Clone, Error)]
#[error("{error} (in state {state:?})")]
pub struct RunFailure {
    /// Why the run stopped
    #[source]
    pub error: OrchestrationError,
    /// State the run was in
    pub state: RunState,
    /// Turns recorded so far
    pub transcript: Option<Transcript>,
}

impl RunFailure {
    /// Failure that keeps the transcript, or discards it when the error is
    /// a cancellation.
    pub fn new(error: OrchestrationError, state: RunState, transcript: Transcript) -> Self {
        let transcript = match &error {
            OrchestrationError::Cancelled | OrchestrationError::TimedOut { .. } => None,
            _ => Some(transcript),
        };
        Self {
            error,
            state,
            transcript,
        }
    }

    /// Failure that discards all partial state.
    pub fn discarded(error: OrchestrationError, state: RunState) -> Self {
        Self {
            error,
            state,
            transcript: None,
        }
    }
}
