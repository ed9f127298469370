//! Configuration schema and loading.
//!
//! Every section and field is optional in TOML; missing values take the
//! defaults below.
//!
//! ```toml
//! [model]
//! name = "openai/gpt-4o-mini"
//! base_url = "https://openrouter.ai/api/v1"
//! api_key_env = "OPENAI_API_KEY"
//!
//! [sandbox]
//! template = "adorable-nextjs"
//! preview_port = 3000
//!
//! [run]
//! max_iterations = 10
//! fragment_title = "Fragment"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use adorable_contracts::error::{AdorableError, AdorableResult};
use adorable_core::{network::DEFAULT_MAX_ITERATIONS, orchestrator::RunSettings};

pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Model provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model identifier sent with every request.
    pub name: String,

    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,

    /// Inline API key. Takes precedence over `api_key_env`.
    pub api_key: Option<String>,

    /// Environment variable read once at startup when `api_key` is unset.
    pub api_key_env: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }
}

impl ModelConfig {
    /// Where the key will come from, without revealing it.
    pub fn api_key_source(&self) -> String {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => "inline".to_string(),
            _ => format!("${}", self.api_key_env),
        }
    }

    /// Resolve the API key from the process environment.
    pub fn resolve_api_key(&self) -> AdorableResult<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// Resolve the API key, looking up `api_key_env` through `lookup`.
    ///
    /// # Errors
    ///
    /// `ConfigError` when neither source yields a non-blank key.
    pub fn resolve_api_key_with<F>(&self, lookup: F) -> AdorableResult<String>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            debug!("using inline model API key");
            return Ok(key.to_string());
        }
        match lookup(&self.api_key_env) {
            Some(key) if !key.trim().is_empty() => {
                debug!(env = %self.api_key_env, "model API key read from environment");
                Ok(key)
            }
            _ => Err(AdorableError::ConfigError {
                reason: format!(
                    "no model API key: set [model] api_key or the {} environment variable",
                    self.api_key_env
                ),
            }),
        }
    }
}

/// Sandbox backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Template every run's sandbox is created from.
    pub template: String,

    /// Port the preview server listens on inside the sandbox.
    pub preview_port: u16,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        let settings = RunSettings::default();
        Self {
            template: settings.sandbox_template,
            preview_port: settings.preview_port,
        }
    }
}

/// Per-run limits and labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub max_iterations: u32,
    pub fragment_title: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        let settings = RunSettings::default();
        Self {
            max_iterations: settings.max_iterations,
            fragment_title: settings.fragment_title,
        }
    }
}

/// The whole configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdorableConfig {
    pub model: ModelConfig,
    pub sandbox: SandboxConfig,
    pub run: RunConfig,
}

impl AdorableConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `AdorableError::ConfigError` if the TOML is malformed, does
    /// not match the schema, or fails `validate`.
    pub fn from_toml_str(s: &str) -> AdorableResult<Self> {
        let config: AdorableConfig = toml::from_str(s).map_err(|e| AdorableError::ConfigError {
            reason: format!("failed to parse config TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as configuration.
    pub fn from_file(path: &Path) -> AdorableResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AdorableError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Reject values the runtime cannot operate with.
    pub fn validate(&self) -> AdorableResult<()> {
        let invalid = |reason: &str| {
            Err(AdorableError::ConfigError {
                reason: reason.to_string(),
            })
        };
        if !(1..=DEFAULT_MAX_ITERATIONS).contains(&self.run.max_iterations) {
            return invalid("[run] max_iterations must be between 1 and 10");
        }
        if self.sandbox.preview_port == 0 {
            return invalid("[sandbox] preview_port must be non-zero");
        }
        if self.sandbox.template.trim().is_empty() {
            return invalid("[sandbox] template must not be empty");
        }
        if self.model.name.trim().is_empty() {
            return invalid("[model] name must not be empty");
        }
        if !(self.model.base_url.starts_with("http://") || self.model.base_url.starts_with("https://")) {
            return invalid("[model] base_url must be an http(s) URL");
        }
        Ok(())
    }

    /// The orchestrator settings this configuration describes.
    pub fn run_settings(&self) -> RunSettings {
        RunSettings {
            sandbox_template: self.sandbox.template.clone(),
            preview_port: self.sandbox.preview_port,
            max_iterations: self.run.max_iterations,
            fragment_title: self.run.fragment_title.clone(),
        }
    }
}
