//! Environment variable loading and management.
//!
//! Secrets and deployment-specific endpoints come from the environment,
//! optionally seeded from a `.env` file.

use std::env;
use std::path::Path;

/// Loads environment variables from .env file and system environment.
#[derive(Debug, Clone)]
pub struct EnvironmentLoader {
    env_file: Option<String>,
}

impl EnvironmentLoader {
    /// Initialize the environment loader.
    ///
    /// # Arguments
    /// * `env_file` - Path to .env file. Nothing is loaded when None.
    pub fn new(env_file: Option<&Path>) -> Self {
        // Only load a .env file if an explicit path was provided. This avoids
        // picking up repository or system .env files during unit tests which
        // expect default values.
        if let Some(path) = env_file {
            if path.exists() {
                if let Err(e) = dotenv::from_path(path) {
                    tracing::warn!(path = %path.display(), error = %e, "failed to load .env file");
                }
            }
        }

        Self {
            env_file: env_file.map(|p| p.to_string_lossy().to_string()),
        }
    }

    /// The `.env` file this loader was created with.
    pub fn env_file(&self) -> Option<&str> {
        self.env_file.as_deref()
    }

    /// Get LLM provider selection from environment.
    pub fn llm_provider(&self) -> Option<String> {
        non_empty_var("LLM_PROVIDER")
    }

    /// API key for the Gemini provider.
    pub fn google_api_key(&self) -> Option<String> {
        non_empty_var("GOOGLE_API_KEY")
    }

    /// Override for the analyzer endpoint configured in `[services]`.
    pub fn seo_service_url(&self) -> Option<String> {
        non_empty_var("SEO_SERVICE_URL")
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Default for EnvironmentLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
