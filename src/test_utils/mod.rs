//! Test doubles for the provider and gateway seams
//!
//! Provides a scripted [`ModelProvider`](crate::provider::ModelProvider) and
//! canned [`ToolService`](crate::gateway::ToolService)s for exercising the
//! orchestration loop and the services without a model or network.

pub mod mocks;

pub use mocks::{FailingProvider, ScriptedProvider, StaticTool};
