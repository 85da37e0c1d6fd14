//! Resolved settings shared by the services.

use crate::config::{ConfigurationLoader, EnvironmentLoader};
use crate::gateway::{PayloadFetcher, PayloadPolicy, RpcClient, SeoAnalysisTool, ToolGateway};
use crate::observability::Logger;
use crate::orchestration::RuntimeConfig;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

/// Instruction for the model driving the SEO agent.
pub const SEO_AGENT_INSTRUCTION: &str = "You are an SEO analysis assistant. Your primary function is to analyze images for SEO purposes.

When a user provides an image URL, use the seo_analysis tool to analyze the image and provide insights about:
- Image content and relevance
- SEO optimization suggestions
- Alt text recommendations
- Any other SEO-related observations

Always use the available tools to perform the analysis rather than making assumptions.";

/// TOML configuration plus environment overrides.
#[derive(Debug)]
pub struct ServiceSettings {
    config: ConfigurationLoader,
    env: EnvironmentLoader,
}

impl ServiceSettings {
    /// Load settings from a TOML file and an optional `.env` file.
    pub fn load(config_path: Option<&Path>, env_file: Option<&Path>) -> Result<Self> {
        let env = EnvironmentLoader::new(env_file);
        let config = ConfigurationLoader::new(config_path).context("Failed to load configuration")?;
        Ok(Self { config, env })
    }

    /// Combine already-loaded configuration and environment.
    pub fn from_parts(config: ConfigurationLoader, env: EnvironmentLoader) -> Self {
        Self { config, env }
    }

    /// The configuration loader.
    pub fn config(&self) -> &ConfigurationLoader {
        &self.config
    }

    /// The environment loader.
    pub fn env(&self) -> &EnvironmentLoader {
        &self.env
    }

    /// Loop limits from `[execution]` and `[tools]`.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            max_round_trips: self.config.config.execution.max_round_trips,
            tool_timeout: Some(self.config.tool_timeout()),
            run_timeout: self.config.run_timeout(),
        }
    }

    /// Payload limits from `[tools]`.
    pub fn payload_policy(&self) -> PayloadPolicy {
        PayloadPolicy {
            max_bytes: self.config.config.tools.max_payload_bytes,
            expected_content_type: self.config.config.tools.expected_content_type.clone(),
        }
    }

    /// Analyzer endpoint; `SEO_SERVICE_URL` wins over the config file.
    pub fn seo_analysis_url(&self) -> Option<String> {
        self.env
            .seo_service_url()
            .or_else(|| self.config.config.services.seo_analysis_url.clone())
    }

    /// Instruction to configure the model provider with.
    pub fn system_instruction(&self) -> &str {
        self.config
            .config
            .agent
            .system_instruction
            .as_deref()
            .unwrap_or(SEO_AGENT_INSTRUCTION)
    }

    /// Open the markdown log configured in `[logging]`.
    pub fn create_logger(&self) -> Result<Arc<Logger>> {
        let logging = &self.config.config.logging;
        let logger = Logger::new(Some(Path::new(&logging.log_file)), Some(&logging.log_level))?;
        Ok(Arc::new(logger))
    }

    /// Gateway exposing the `seo_analysis` tool.
    pub fn build_gateway(&self) -> Result<ToolGateway> {
        let url = self.seo_analysis_url().context(
            "seo_analysis_url is not configured (set [services] seo_analysis_url or SEO_SERVICE_URL)",
        )?;

        let mut tool = SeoAnalysisTool::new(RpcClient::new(url));
        if self.config.config.services.prefetch_images {
            tool = tool.with_prefetch(PayloadFetcher::new(self.payload_policy()));
        }

        let mut gateway = ToolGateway::new().with_default_timeout(self.config.tool_timeout());
        gateway.register(Arc::new(tool))?;
        Ok(gateway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Configuration;
    use std::time::Duration;

    fn settings(config: Configuration) -> ServiceSettings {
        ServiceSettings::from_parts(
            ConfigurationLoader::from_config(config),
            EnvironmentLoader::default(),
        )
    }

    #[test]
    fn test_runtime_config_from_sections() {
        let mut config = Configuration::default();
        config.execution.max_round_trips = 3;
        config.execution.run_timeout_seconds = Some(60);
        config.tools.timeout_seconds = 10;

        let runtime = settings(config).runtime_config();
        assert_eq!(runtime.max_round_trips, 3);
        assert_eq!(runtime.tool_timeout, Some(Duration::from_secs(10)));
        assert_eq!(runtime.run_timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_payload_policy_from_tools_section() {
        let mut config = Configuration::default();
        config.tools.max_payload_bytes = 1024;
        let policy = settings(config).payload_policy();
        assert_eq!(policy.max_bytes, 1024);
        assert_eq!(policy.expected_content_type, "image/*");
    }

    #[test]
    fn test_system_instruction_default_and_override() {
        assert!(settings(Configuration::default())
            .system_instruction()
            .starts_with("You are an SEO analysis assistant"));

        let mut config = Configuration::default();
        config.agent.system_instruction = Some("Be brief".into());
        assert_eq!(settings(config).system_instruction(), "Be brief");
    }

    #[test]
    fn test_gateway_registers_seo_tool() {
        let mut config = Configuration::default();
        config.services.seo_analysis_url = Some("http://localhost:50071/rpc".into());
        let gateway = settings(config).build_gateway().unwrap();
        assert_eq!(gateway.names(), vec!["seo_analysis"]);
        assert_eq!(gateway.default_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_create_logger_uses_logging_section() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Configuration::default();
        config.logging.log_file = dir.path().join("agent.md").to_string_lossy().to_string();
        config.logging.log_level = "debug".into();

        let logger = settings(config).create_logger().unwrap();
        assert_eq!(logger.log_level(), "DEBUG");
        assert!(dir.path().join("agent.md").exists());
    }
}
