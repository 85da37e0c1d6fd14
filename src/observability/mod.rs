//! Observability utilities for agent runs.
//!
//! This module provides the markdown interaction log and installation of a
//! `tracing` subscriber for the library's diagnostics.
//!
//! # Example
//!
//! ```no_run
//! use stox_agent::observability::{init_tracing, Logger};
//! use std::collections::HashMap;
//!
//! init_tracing("info");
//!
//! // Create a logger
//! let logger = Logger::new(None, Some("DEBUG")).unwrap();
//!
//! // Log a session start
//! let config = HashMap::new();
//! logger.log_session_start("seo", &config).unwrap();
//!
//! // Log a tool invocation
//! logger.log_tool_invocation("seo_analysis", "{}", "ok", true).unwrap();
//!
//! // Log completion
//! logger.log_completion("Task completed").unwrap();
//! ```

pub mod logger;
mod tracing_setup;

// Re-export main types for convenience
pub use logger::Logger;
pub use tracing_setup::init_tracing;
