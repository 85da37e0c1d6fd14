//! Streaming response chunks.

use super::tools::ToolCall;
use serde::{Deserialize, Serialize};

/// One fragment of a binary payload (for example an inline image).
///
/// Fragments that share the same `payload` ordinal belong to the same logical
/// payload and are concatenated in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryFragment {
    /// Ordinal of the logical payload this fragment belongs to
    pub payload: u32,
    /// Raw bytes
    pub data: Vec<u8>,
    /// Declared mime type, if the provider sent one with this fragment
    pub mime_type: Option<String>,
}

/// Incremental unit of a model response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StreamChunk {
    /// Text delta
    Text(String),
    /// Binary payload fragment
    Binary(BinaryFragment),
    /// The model asks for a tool instead of answering
    ToolCall(ToolCall),
    /// Stream completed
    Done,
}

impl StreamChunk {
    /// Text delta chunk.
    pub fn text(fragment: impl Into<String>) -> Self {
        Self::Text(fragment.into())
    }

    /// Binary fragment chunk.
    pub fn binary(payload: u32, data: impl Into<Vec<u8>>, mime_type: Option<&str>) -> Self {
        Self::Binary(BinaryFragment {
            payload,
            data: data.into(),
            mime_type: mime_type.map(str::to_string),
        })
    }

    /// Short label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Binary(_) => "binary",
            Self::ToolCall(_) => "tool_call",
            Self::Done => "done",
        }
    }
}
