//! Model provider abstraction module
//!
//! This module provides the provider trait and the transcript, tool-call and
//! stream-chunk types every other layer speaks.

pub mod traits;
pub mod types;

// Re-export main types
pub use traits::{ModelProvider, StreamingResponse};
pub use types::{
    BinaryFragment, ConversationTurn, Role, StreamChunk, ToolCall, Transcript, TurnContent,
};

// Re-export tool declaration types from umf
pub use umf::{Function, Tool};
