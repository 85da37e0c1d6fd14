//! Error types for structured extraction.

use super::Strategy;
use thiserror::Error;

/// Maximum number of characters of the source text carried in a failure.
pub const PREVIEW_CHARS: usize = 500;

/// Errors that can occur while recovering structured fields.
///
/// # Example
///
/// ```
/// use stox_agent::extraction::{ExtractionError, Strategy};
///
/// let error = ExtractionError::failed(
///     vec![Strategy::StructuredLiteral],
///     vec!["title".to_string()],
///     "no fields here",
/// );
/// assert!(error.to_string().contains("title"));
/// ```
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// Every strategy ran and at least one required field is still missing.
    #[error("extraction failed after {} strategies, missing fields [{}]: {text_preview}", .attempted_strategies.len(), .missing_fields.join(", "))]
    ExtractionFailed {
        /// Strategies that were tried, in order.
        attempted_strategies: Vec<Strategy>,
        /// Required fields no strategy could resolve.
        missing_fields: Vec<String>,
        /// Bounded preview of the source text.
        text_preview: String,
    },

    /// A schema must name at least one field.
    #[error("schema has no fields")]
    EmptySchema,

    /// A field pattern could not be compiled.
    #[error("invalid pattern for field {field}: {message}")]
    InvalidPattern {
        /// Field whose pattern failed.
        field: String,
        /// Regex compiler message.
        message: String,
    },

    /// A typed record was built from a result that lacks one of its fields.
    #[error("extracted result has no field {name}")]
    MissingField {
        /// Name of the absent field.
        name: String,
    },
}

impl ExtractionError {
    /// Create an ExtractionFailed error, bounding the preview.
    pub fn failed(
        attempted_strategies: Vec<Strategy>,
        missing_fields: Vec<String>,
        raw_text: &str,
    ) -> Self {
        Self::ExtractionFailed {
            attempted_strategies,
            missing_fields,
            text_preview: preview(raw_text),
        }
    }

    /// Create a MissingField error.
    pub fn missing_field(name: impl Into<String>) -> Self {
        Self::MissingField { name: name.into() }
    }
}

/// First [`PREVIEW_CHARS`] characters of `text`, with `...` appended when cut.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_error_lists_missing_fields() {
        let error = ExtractionError::failed(
            Strategy::ALL.to_vec(),
            vec!["title".into(), "description".into()],
            "garbage",
        );
        let message = error.to_string();
        assert!(message.contains("3 strategies"));
        assert!(message.contains("title, description"));
        assert!(message.contains("garbage"));
    }

    #[test]
    fn test_preview_is_bounded() {
        let long = "x".repeat(2_000);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let text = "ş".repeat(600);
        let p = preview(&text);
        assert!(p.starts_with("şş"));
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_short_text_preview_unchanged() {
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_missing_field_error() {
        let error = ExtractionError::missing_field("title");
        assert!(error.to_string().contains("no field title"));
    }
}
