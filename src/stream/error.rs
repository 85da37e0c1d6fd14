//! Error types for stream consumption.

use thiserror::Error;

/// Errors raised while draining a model response stream.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StreamError {
    /// The underlying transport failed mid-stream.
    #[error("stream transport failed after {chunks} chunks: {message}")]
    Transport {
        /// Chunks successfully received before the failure.
        chunks: usize,
        /// Description of the transport failure.
        message: String,
    },

    /// The stream ended without producing a single chunk or terminal marker.
    #[error("stream ended without producing any output")]
    Empty,

    /// Consumption was cancelled by the caller.
    #[error("stream consumption cancelled")]
    Cancelled,
}

impl StreamError {
    /// Create a Transport error.
    pub fn transport(chunks: usize, message: impl Into<String>) -> Self {
        Self::Transport {
            chunks,
            message: message.into(),
        }
    }
}
