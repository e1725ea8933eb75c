//! Configuration System
//!
//! Process-wide settings for the generation pipeline: upstream endpoint, retry schedule,
//! invalid-input policy and logging. Loaded once at startup (defaults, then an optional TOML
//! file, then `FIELDGEN__*` environment variables) and injected read-only into the generator.

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::provider::RetryPolicy;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8787/api/ai";

/// What to do with a request that fails normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidInputPolicy {
    /// Return the validation error to the caller.
    #[default]
    Reject,
    /// Answer with degraded fallback content instead.
    Fallback,
}

/// Upstream generation service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token, if the service wants one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Retry schedule for transient upstream failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Delay before each retry; the last entry repeats
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: Vec<u64>,
}

fn default_max_retries() -> usize {
    2
}

fn default_backoff_ms() -> Vec<u64> {
    vec![250, 500]
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff: self
                .backoff_ms
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub invalid_input: InvalidInputPolicy,

    /// Per-call deadline covering every attempt and backoff (none: unbounded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_deadline_ms: Option<u64>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigProblem {
    Upstream(String),
    Retry(String),
    Deadline(String),
    Logging(String),
}

impl std::fmt::Display for ConfigProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigProblem::Upstream(msg) => write!(f, "Upstream: {}", msg),
            ConfigProblem::Retry(msg) => write!(f, "Retry: {}", msg),
            ConfigProblem::Deadline(msg) => write!(f, "Deadline: {}", msg),
            ConfigProblem::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ConfigProblem {}

impl GeneratorConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ConfigProblem>> {
        let mut problems = Vec::new();

        let base_url = self.upstream.base_url.trim();
        if base_url.is_empty() {
            problems.push(ConfigProblem::Upstream("base_url cannot be empty".to_string()));
        } else if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            problems.push(ConfigProblem::Upstream(format!(
                "base_url must be an http(s) URL, got '{}'",
                base_url
            )));
        }
        if self.upstream.connect_timeout_secs == 0 {
            problems.push(ConfigProblem::Upstream(
                "connect_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.upstream.request_timeout_secs == 0 {
            problems.push(ConfigProblem::Upstream(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.retry.max_retries > 0 && self.retry.backoff_ms.is_empty() {
            problems.push(ConfigProblem::Retry(
                "backoff_ms needs at least one entry when retries are enabled".to_string(),
            ));
        }

        if self.call_deadline_ms == Some(0) {
            problems.push(ConfigProblem::Deadline(
                "call_deadline_ms must be greater than zero".to_string(),
            ));
        }

        const LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];
        let level = self.logging.level.to_lowercase();
        if !LEVELS.contains(&level.as_str()) {
            problems.push(ConfigProblem::Logging(format!(
                "level must be one of {}, got '{}'",
                LEVELS.join(", "),
                self.logging.level
            )));
        }
        if !matches!(self.logging.format.as_str(), "json" | "text") {
            problems.push(ConfigProblem::Logging(format!(
                "format must be 'json' or 'text', got '{}'",
                self.logging.format
            )));
        }
        if !matches!(self.logging.output.as_str(), "stdout" | "stderr") {
            problems.push(ConfigProblem::Logging(format!(
                "output must be 'stdout' or 'stderr', got '{}'",
                self.logging.output
            )));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }

    /// [`validate`](Self::validate), with every problem folded into one [`ApiError::ConfigError`].
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|problems| {
            let msgs: Vec<String> = problems.iter().map(|p| p.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })
    }

    pub fn call_deadline(&self) -> Option<Duration> {
        self.call_deadline_ms.map(Duration::from_millis)
    }
}

/// Loads [`GeneratorConfig`] from layered sources.
pub struct ConfigLoader;

impl ConfigLoader {
    pub const ENV_PREFIX: &'static str = "FIELDGEN";

    fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("upstream.base_url", DEFAULT_BASE_URL)?
            .set_default("retry.max_retries", default_max_retries() as i64)?
            .set_default("invalid_input", "reject")
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<GeneratorConfig, ApiError> {
        let config: GeneratorConfig = builder.build()?.try_deserialize()?;
        config.ensure_valid()?;
        Ok(config)
    }

    /// Defaults, then `path` if given (must exist), then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<GeneratorConfig, ApiError> {
        let mut builder = Self::builder_with_defaults()?;
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(Self::ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("retry.backoff_ms"),
        );
        Self::finish(builder)
    }

    /// Defaults plus a single file, ignoring the environment.
    pub fn load_from_file(path: &Path) -> Result<GeneratorConfig, ApiError> {
        let builder = Self::builder_with_defaults()?.add_source(File::from(path).required(true));
        Self::finish(builder)
    }
}
