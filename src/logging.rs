//! Logging System
//!
//! Structured logging via `tracing`. Level, format and destination come from
//! [`LoggingConfig`], with `FIELDGEN_LOG*` environment variables taking precedence.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging settings as they appear in the `[logging]` config table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn, error or off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// json or text
    #[serde(default = "default_format")]
    pub format: String,

    /// stdout or stderr; stdout is reserved for command output by default
    #[serde(default = "default_output")]
    pub output: String,

    /// ANSI colors, text format only
    #[serde(default = "default_true")]
    pub color: bool,

    /// Per-module level directives, e.g. `fieldgen::provider = "debug"`
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Stdout,
    Stderr,
}

impl Output {
    fn writer(self) -> BoxMakeWriter {
        match self {
            Output::Stdout => BoxMakeWriter::new(std::io::stdout),
            Output::Stderr => BoxMakeWriter::new(std::io::stderr),
        }
    }
}

/// Effective settings after environment overrides are applied.
#[derive(Debug)]
struct Resolved {
    filter: EnvFilter,
    json: bool,
    output: Output,
    color: bool,
}

impl Resolved {
    fn from_sources(config: Option<&LoggingConfig>) -> Result<Self, ApiError> {
        Ok(Self {
            filter: build_env_filter(config)?,
            json: determine_format(config)? == "json",
            output: determine_output(config)?,
            color: config.map(|c| c.color).unwrap_or(true),
        })
    }
}

/// Install the global subscriber.
///
/// `FIELDGEN_LOG`, `FIELDGEN_LOG_FORMAT` and `FIELDGEN_LOG_OUTPUT` win over `config`, which
/// wins over the defaults. Fails if a subscriber is already installed.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), ApiError> {
    let resolved = Resolved::from_sources(config)?;
    let registry = Registry::default().with(resolved.filter);
    let layer = fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339())
        .with_writer(resolved.output.writer());

    let result = if resolved.json {
        registry.with(layer.json()).try_init()
    } else {
        registry.with(layer.with_ansi(resolved.color)).try_init()
    };

    result.map_err(|e| ApiError::ConfigError(format!("Failed to initialize logging: {}", e)))
}

fn build_env_filter(config: Option<&LoggingConfig>) -> Result<EnvFilter, ApiError> {
    if let Ok(filter) = EnvFilter::try_from_env("FIELDGEN_LOG") {
        return Ok(filter);
    }

    let Some(config) = config else {
        return Ok(EnvFilter::new("info"));
    };
    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    config
        .modules
        .iter()
        .try_fold(EnvFilter::new(&config.level), |filter, (module, level)| {
            let directive = format!("{}={}", module, level)
                .parse::<Directive>()
                .map_err(|e| ApiError::ConfigError(format!("Invalid log directive: {}", e)))?;
            Ok(filter.add_directive(directive))
        })
}

fn determine_format(config: Option<&LoggingConfig>) -> Result<String, ApiError> {
    let from_env = std::env::var("FIELDGEN_LOG_FORMAT")
        .ok()
        .filter(|f| f == "json" || f == "text");
    if let Some(format) = from_env {
        return Ok(format);
    }

    match config.map(|c| c.format.as_str()).unwrap_or("text") {
        format @ ("json" | "text") => Ok(format.to_string()),
        other => Err(ApiError::ConfigError(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            other
        ))),
    }
}

fn determine_output(config: Option<&LoggingConfig>) -> Result<Output, ApiError> {
    match std::env::var("FIELDGEN_LOG_OUTPUT") {
        Ok(output) => parse_output(&output),
        Err(_) => parse_output(config.map(|c| c.output.as_str()).unwrap_or("stderr")),
    }
}

fn parse_output(output: &str) -> Result<Output, ApiError> {
    match output {
        "stdout" => Ok(Output::Stdout),
        "stderr" => Ok(Output::Stderr),
        _ => Err(ApiError::ConfigError(format!(
            "Invalid log output: {} (must be 'stdout' or 'stderr')",
            output
        ))),
    }
}
