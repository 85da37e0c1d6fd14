//! Provider-agnostic types shared by the stream, gateway and orchestration layers.

pub mod stream;
pub mod tools;
pub mod transcript;

pub use stream::{BinaryFragment, StreamChunk};
pub use tools::ToolCall;
pub use transcript::{ConversationTurn, Role, Transcript, TurnContent};
