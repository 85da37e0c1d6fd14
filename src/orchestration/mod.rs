//! Orchestration loop - bounded tool-calling conversations
//!
//! The [`Orchestrator`] drives one request through the state machine
//!
//! ```text
//! Start -> AwaitingModel -> (ToolRequested -> AwaitingTool -> AwaitingModel)* -> Final -> Done
//! ```
//!
//! Each model turn is drained by the [`StreamMultiplexer`](crate::stream::StreamMultiplexer);
//! tool calls go through the [`ToolGateway`](crate::gateway::ToolGateway) and come back as
//! tool turns; a final answer is optionally run through the
//! [`StructuredExtractor`](crate::extraction::StructuredExtractor).
//!
//! After `max_round_trips` tool round-trips a further tool request closes the
//! run with a degraded [`FinalOutput::Exhausted`] answer instead of an error.

pub mod error;
pub mod handle;
pub mod runtime;
pub mod tools;

// Re-export main types
pub use error::{OrchestrationError, RunFailure};
pub use handle::OrchestratorHandle;
pub use runtime::{
    FinalOutput, Orchestrator, RunOutput, RunState, RuntimeConfig, DEFAULT_MAX_ROUND_TRIPS,
};
pub use tools::ToolCoordinator;
