//! Markdown interaction log for agent runs.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Text longer than this is cut in log entries.
const MAX_LOGGED_CHARS: usize = 2_000;

/// Logger for agent runs, tool invocations and service calls.
///
/// Entries are appended to a markdown file and mirrored as `tracing` events,
/// so the file is a readable record of a session while the subscriber
/// carries the operational signal.
#[derive(Debug)]
pub struct Logger {
    log_file: PathBuf,
    log_level: String,
}

impl Logger {
    /// Initialize logger.
    ///
    /// # Arguments
    /// * `log_file` - Path to log file. If None, creates a timestamped file in temp directory.
    /// * `log_level` - Logging level (defaults to "INFO").
    pub fn new(log_file: Option<&Path>, log_level: Option<&str>) -> Result<Self> {
        let log_file = match log_file {
            Some(p) => p.to_path_buf(),
            None => std::env::temp_dir().join("stox-agent").join(format!(
                "stox_agent_{}_{}.md",
                Utc::now().timestamp_millis(),
                std::process::id()
            )),
        };

        if let Some(parent) = log_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
        }

        let logger = Self {
            log_file,
            log_level: log_level.unwrap_or("INFO").to_uppercase(),
        };

        if !logger.log_file.exists() {
            logger.initialize_log_file()?;
        }

        Ok(logger)
    }

    fn initialize_log_file(&self) -> Result<()> {
        let mut file = File::create(&self.log_file)
            .with_context(|| format!("Failed to create log file: {}", self.log_file.display()))?;

        writeln!(file, "# Stox Agent Log\n")?;
        writeln!(file, "Log started: {}\n", Utc::now().to_rfc3339())?;
        writeln!(file, "---\n")?;
        Ok(())
    }

    fn append_to_log(&self, content: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .with_context(|| format!("Failed to open log file: {}", self.log_file.display()))?;

        write!(file, "{}", content).with_context(|| "Failed to write to log file")?;
        Ok(())
    }

    fn is_debug(&self) -> bool {
        matches!(self.log_level.as_str(), "DEBUG" | "TRACE")
    }

    /// Log session start.
    ///
    /// # Arguments
    /// * `mode` - Entry point that opened the session (chat, seo, analyze, retouch).
    /// * `config` - Settings worth recording alongside the session.
    pub fn log_session_start(
        &self,
        mode: &str,
        config: &HashMap<String, serde_json::Value>,
    ) -> Result<()> {
        let now: DateTime<Utc> = Utc::now();
        let content = format!(
            "## Session Started - {}\n\n**Mode:** {}\n**Config:** {}\n\n",
            now.to_rfc3339(),
            mode,
            serde_json::to_string_pretty(config).unwrap_or_default()
        );

        self.append_to_log(&content)?;
        tracing::info!(mode, "session started");
        Ok(())
    }

    /// Log one transcript turn.
    ///
    /// # Arguments
    /// * `index` - Position in the transcript.
    /// * `role` - Producer of the turn.
    /// * `summary` - Printable rendering of the turn content.
    pub fn log_turn(&self, index: usize, role: &str, summary: &str) -> Result<()> {
        if summary.trim().is_empty() && !self.is_debug() {
            return Ok(());
        }

        let content = format!(
            "### Turn {} ({}) - {}\n\n```\n{}\n```\n\n",
            index,
            role,
            Utc::now().to_rfc3339(),
            truncate(summary)
        );

        self.append_to_log(&content)?;
        tracing::debug!(index, role, "turn logged");
        Ok(())
    }

    /// Log a tool invocation with its rendered outcome.
    ///
    /// # Arguments
    /// * `tool_name` - Name of the tool executed.
    /// * `tool_args` - Arguments passed to the tool, rendered.
    /// * `result` - Rendered payload or error.
    /// * `success` - Whether the invocation succeeded.
    pub fn log_tool_invocation(
        &self,
        tool_name: &str,
        tool_args: &str,
        result: &str,
        success: bool,
    ) -> Result<()> {
        let status = if success { "Result" } else { "Error" };
        let content = format!(
            "### Tool Invocation - {}\n\n**Tool:** {}\n**Args:** {}\n**{}:** {}\n\n",
            Utc::now().to_rfc3339(),
            tool_name,
            tool_args,
            status,
            truncate(result)
        );

        self.append_to_log(&content)?;
        if success {
            tracing::info!(tool = tool_name, "tool invocation succeeded");
        } else {
            tracing::warn!(tool = tool_name, error = result, "tool invocation failed");
        }
        Ok(())
    }

    /// Log the outcome of a structured extraction.
    ///
    /// # Arguments
    /// * `fields` - Extracted field values, empty on failure.
    /// * `confidence` - Strategy tier that succeeded, if any.
    pub fn log_extraction(
        &self,
        fields: &HashMap<String, String>,
        confidence: Option<&str>,
    ) -> Result<()> {
        let mut names: Vec<&String> = fields.keys().collect();
        names.sort();

        let mut content = format!(
            "### Extraction - {}\n\n**Confidence:** {}\n",
            Utc::now().to_rfc3339(),
            confidence.unwrap_or("none")
        );
        for name in names {
            content.push_str(&format!("- **{}:** {}\n", name, truncate(&fields[name])));
        }
        content.push('\n');

        self.append_to_log(&content)?;
        tracing::info!(fields = fields.len(), confidence, "extraction logged");
        Ok(())
    }

    /// Log a service API call.
    ///
    /// # Arguments
    /// * `operation` - Operation name.
    /// * `duration` - Wall time spent.
    /// * `success` - Whether the call succeeded.
    /// * `sizes` - Request and response sizes worth recording (bytes, chars).
    pub fn log_api_call(
        &self,
        operation: &str,
        duration: Duration,
        success: bool,
        sizes: &HashMap<String, u64>,
    ) -> Result<()> {
        let mut keys: Vec<&String> = sizes.keys().collect();
        keys.sort();
        let sizes_line = keys
            .iter()
            .map(|k| format!("{}={}", k, sizes[*k]))
            .collect::<Vec<_>>()
            .join(", ");

        let content = format!(
            "### API Call - {}\n\n**Operation:** {}\n**Duration:** {:.3}s\n**Success:** {}\n**Sizes:** {}\n\n",
            Utc::now().to_rfc3339(),
            operation,
            duration.as_secs_f64(),
            success,
            if sizes_line.is_empty() { "-" } else { &sizes_line }
        );

        self.append_to_log(&content)?;
        tracing::info!(
            operation,
            duration_ms = duration.as_millis() as u64,
            success,
            "api call"
        );
        Ok(())
    }

    /// Log error with context.
    ///
    /// # Arguments
    /// * `error` - Error message.
    /// * `context` - Additional context information.
    pub fn log_error(
        &self,
        error: &str,
        context: Option<&HashMap<String, serde_json::Value>>,
    ) -> Result<()> {
        let mut content = format!(
            "### Error - {}\n\n**Error:** {}\n\n",
            Utc::now().to_rfc3339(),
            error
        );

        if let Some(ctx) = context {
            content.push_str(&format!(
                "**Context:** {}\n\n",
                serde_json::to_string_pretty(ctx).unwrap_or_default()
            ));
        }

        self.append_to_log(&content)?;
        tracing::error!(error, "agent error");
        Ok(())
    }

    /// Log session completion.
    ///
    /// # Arguments
    /// * `reason` - Reason for completion.
    pub fn log_completion(&self, reason: &str) -> Result<()> {
        let content = format!(
            "### Session Completed - {}\n\n**Reason:** {}\n\n---\n\n",
            Utc::now().to_rfc3339(),
            reason
        );

        self.append_to_log(&content)?;
        tracing::info!(reason, "session completed");
        Ok(())
    }

    /// Get the log file path.
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Get the log level.
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_LOGGED_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_LOGGED_CHARS).collect();
    format!("{cut}... [truncated]")
}
