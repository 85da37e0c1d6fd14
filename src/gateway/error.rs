//! Error types for the tool gateway.

use thiserror::Error;

/// Normalized failure of a tool invocation.
///
/// Every failure a tool can hit collapses into one of these variants and is
/// carried inside a [`ToolResult`](crate::gateway::ToolResult); the
/// orchestration loop never sees a tool failure as an error of its own.
///
/// # Example
///
/// ```
/// use stox_agent::gateway::ToolError;
///
/// let error = ToolError::not_found("unknown_tool");
/// assert_eq!(error.kind(), "not_found");
/// assert!(error.to_string().contains("unknown_tool"));
/// ```
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
	/// No tool with this name is registered.
	#[error("tool not found: {name}")]
	NotFound {
		/// Name the model asked for.
		name: String,
	},

	/// A tool with the same name is already registered.
	#[error("tool already registered: {name}")]
	DuplicateName {
		/// Name of the duplicate tool.
		name: String,
	},

	/// Arguments did not satisfy the tool's declared parameters.
	#[error("invalid arguments for {name}: {message}")]
	InvalidArguments {
		/// Tool that rejected the arguments.
		name: String,
		/// Description of the validation failure.
		message: String,
	},

	/// The payload exceeded the configured size limit.
	#[error("payload too large: {} exceeds limit of {limit} bytes", size_label(.actual))]
	PayloadTooLarge {
		/// Configured maximum, in bytes.
		limit: u64,
		/// Size observed when the limit was crossed, if known.
		actual: Option<u64>,
	},

	/// The declared content type is outside the expected category.
	#[error("invalid content type: expected {expected}, got {actual}")]
	InvalidContentType {
		/// Expected category, e.g. `image/*`.
		expected: String,
		/// Content type that was declared.
		actual: String,
	},

	/// The payload could not be decoded.
	#[error("malformed payload: {message}")]
	MalformedPayload {
		/// Description of the decode failure.
		message: String,
	},

	/// The tool did not answer in time.
	#[error("tool {name} timed out after {after_ms}ms")]
	Timeout {
		/// Tool that timed out.
		name: String,
		/// Elapsed budget in milliseconds.
		after_ms: u64,
	},

	/// The remote endpoint could not be reached or answered garbage.
	#[error("transport error: {message}")]
	Transport {
		/// Description of the transport failure.
		message: String,
	},

	/// The remote service answered with an error object.
	#[error("remote error {code}: {message}")]
	Remote {
		/// Remote error code.
		code: i64,
		/// Remote error message.
		message: String,
	},
}

impl ToolError {
	/// Create a NotFound error.
	pub fn not_found(name: impl Into<String>) -> Self {
		Self::NotFound { name: name.into() }
	}

	/// Create a DuplicateName error.
	pub fn duplicate_name(name: impl Into<String>) -> Self {
		Self::DuplicateName { name: name.into() }
	}

	/// Create an InvalidArguments error.
	pub fn invalid_arguments(name: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidArguments {
			name: name.into(),
			message: message.into(),
		}
	}

	/// Create a PayloadTooLarge error.
	pub fn payload_too_large(limit: u64, actual: Option<u64>) -> Self {
		Self::PayloadTooLarge { limit, actual }
	}

	/// Create an InvalidContentType error.
	pub fn invalid_content_type(expected: impl Into<String>, actual: impl Into<String>) -> Self {
		Self::InvalidContentType {
			expected: expected.into(),
			actual: actual.into(),
		}
	}

	/// Create a MalformedPayload error.
	pub fn malformed(message: impl Into<String>) -> Self {
		Self::MalformedPayload {
			message: message.into(),
		}
	}

	/// Create a Timeout error.
	pub fn timeout(name: impl Into<String>, after_ms: u64) -> Self {
		Self::Timeout {
			name: name.into(),
			after_ms,
		}
	}

	/// Create a Transport error.
	pub fn transport(message: impl Into<String>) -> Self {
		Self::Transport {
			message: message.into(),
		}
	}

	/// Create a Remote error.
	pub fn remote(code: i64, message: impl Into<String>) -> Self {
		Self::Remote {
			code,
			message: message.into(),
		}
	}

	/// Stable snake_case name of the variant.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::NotFound { .. } => "not_found",
			Self::DuplicateName { .. } => "duplicate_name",
			Self::InvalidArguments { .. } => "invalid_arguments",
			Self::PayloadTooLarge { .. } => "payload_too_large",
			Self::InvalidContentType { .. } => "invalid_content_type",
			Self::MalformedPayload { .. } => "malformed_payload",
			Self::Timeout { .. } => "timeout",
			Self::Transport { .. } => "transport",
			Self::Remote { .. } => "remote",
		}
	}
}

fn size_label(actual: &Option<u64>) -> String {
	match actual {
		Some(bytes) => format!("{bytes} bytes"),
		None => "body".to_string(),
	}
}
