//! Error types for the product image services.

use crate::extraction::ExtractionError;
use crate::gateway::ToolError;
use crate::orchestration::RunFailure;
use thiserror::Error;

/// Errors surfaced by the agent, analyzer and retoucher services.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// A required request field was absent or blank.
    #[error("Missing {field} in request")]
    MissingInput {
        /// Name of the request field
        field: String,
    },

    /// The uploaded or downloaded image failed validation.
    #[error("invalid image: {0}")]
    InvalidImage(#[from] ToolError),

    /// The orchestration run terminated without an answer.
    #[error(transparent)]
    Run(#[from] RunFailure),

    /// The answer did not resolve into the expected record.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The run was closed by the round-trip cap.
    #[error("no final answer: {message}")]
    Degraded {
        /// Explanation appended to the transcript
        message: String,
    },

    /// The model answered without an image.
    #[error("model returned no image")]
    NoImage,

    /// Lazy construction of the orchestrator failed.
    #[error("agent initialization failed: {message}")]
    Initialization {
        /// Error chain of the failed construction
        message: String,
    },
}

impl ServiceError {
    /// Create a MissingInput error.
    pub fn missing_input(field: impl Into<String>) -> Self {
        Self::MissingInput {
            field: field.into(),
        }
    }

    /// Create an Initialization error from a construction failure.
    pub fn initialization(error: &anyhow::Error) -> Self {
        Self::Initialization {
            message: format!("{error:#}"),
        }
    }
}
