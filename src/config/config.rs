//! TOML configuration parsing and management.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub services: ServicesConfig,
    pub llm: Option<LlmConfig>,
}

/// Agent configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    pub version: String,
    /// Instruction handed to the model provider, if any
    pub system_instruction: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "stox-agent".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            system_instruction: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub log_file: String,
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: std::env::temp_dir()
                .join("stox-agent")
                .join(format!(
                    "stox_agent_{}_{}.md",
                    Utc::now().timestamp_millis(),
                    std::process::id()
                ))
                .to_string_lossy()
                .to_string(),
            log_level: "INFO".to_string(),
        }
    }
}

/// Execution configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Tool round-trips per run
    #[serde(default = "default_max_round_trips")]
    pub max_round_trips: u32,
    /// Whole-run budget; unlimited when absent
    pub run_timeout_seconds: Option<u64>,
}

fn default_max_round_trips() -> u32 {
    5
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_round_trips: default_max_round_trips(),
            run_timeout_seconds: None,
        }
    }
}

/// Tools configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_tool_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: u64,
    #[serde(default = "default_expected_content_type")]
    pub expected_content_type: String,
}

fn default_tool_timeout() -> u64 {
    30
}

fn default_max_payload_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_expected_content_type() -> String {
    "image/*".to_string()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_tool_timeout(),
            max_payload_bytes: default_max_payload_bytes(),
            expected_content_type: default_expected_content_type(),
        }
    }
}

/// Remote service endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServicesConfig {
    /// JSON-RPC endpoint of the product image analyzer
    pub seo_analysis_url: Option<String>,
    /// Download images locally before forwarding them to the analyzer
    #[serde(default)]
    pub prefetch_images: bool,
}

/// LLM provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    pub model: Option<String>,
    pub enable_streaming: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: None,
            enable_streaming: true,
        }
    }
}

/// Loads and manages TOML configuration.
#[derive(Debug)]
pub struct ConfigurationLoader {
    pub config_path: PathBuf,
    pub config: Configuration,
}

impl ConfigurationLoader {
    /// Initialize configuration loader.
    ///
    /// # Arguments
    /// * `config_path` - Path to TOML config file. If None or missing, uses default config.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config_path = config_path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("config/agent.toml"));

        let config = if config_path.exists() {
            Self::load_config(&config_path)?
        } else {
            Self::get_default_config()
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Create a configuration loader from a pre-parsed Configuration.
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config_path: PathBuf::from("config/agent.toml"),
            config,
        }
    }

    /// Load configuration from TOML file.
    fn load_config(path: &Path) -> Result<Configuration> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }

    /// Get default configuration.
    fn get_default_config() -> Configuration {
        Configuration {
            llm: Some(LlmConfig::default()),
            ..Configuration::default()
        }
    }

    /// Get configuration value by dot-notation key.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match key {
            "agent.name" => Some(self.config.agent.name.clone()),
            "agent.version" => Some(self.config.agent.version.clone()),
            "agent.system_instruction" => self.config.agent.system_instruction.clone(),
            "logging.log_file" => Some(self.config.logging.log_file.clone()),
            "logging.log_level" => Some(self.config.logging.log_level.clone()),
            "tools.expected_content_type" => Some(self.config.tools.expected_content_type.clone()),
            "services.seo_analysis_url" => self.config.services.seo_analysis_url.clone(),
            "llm.model" => self.config.llm.as_ref().and_then(|c| c.model.clone()),
            _ => None,
        }
    }

    /// Get numeric configuration value.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match key {
            "execution.max_round_trips" => Some(u64::from(self.config.execution.max_round_trips)),
            "execution.run_timeout_seconds" => self.config.execution.run_timeout_seconds,
            "tools.timeout_seconds" => Some(self.config.tools.timeout_seconds),
            "tools.max_payload_bytes" => Some(self.config.tools.max_payload_bytes),
            _ => None,
        }
    }

    /// Get boolean configuration value.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match key {
            "llm.enable_streaming" => Some(self.get_llm_streaming_enabled()),
            "services.prefetch_images" => Some(self.config.services.prefetch_images),
            _ => None,
        }
    }

    /// Get LLM streaming enablement configuration.
    pub fn get_llm_streaming_enabled(&self) -> bool {
        self.config
            .llm
            .as_ref()
            .map(|c| c.enable_streaming)
            .unwrap_or(true)
    }

    /// Per-call tool budget.
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.config.tools.timeout_seconds)
    }

    /// Whole-run budget, if configured.
    pub fn run_timeout(&self) -> Option<Duration> {
        self.config.execution.run_timeout_seconds.map(Duration::from_secs)
    }
}
