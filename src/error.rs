//! Error types for the fieldgen content generation pipeline.

use thiserror::Error;

/// Caller input rejected before any upstream call is made.
///
/// This is the only failure a caller of the generation entry points can observe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    MissingField { field: &'static str },

    #[error("Required field is empty: {field}")]
    EmptyField { field: &'static str },

    #[error("Required field too short: {field} (minimum {min} characters after trimming)")]
    TooShort { field: &'static str, min: usize },
}

impl ValidationError {
    /// Name of the offending request field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField { field }
            | ValidationError::EmptyField { field }
            | ValidationError::TooShort { field, .. } => field,
        }
    }
}

/// Upstream failure modes, normalized at the client boundary.
///
/// None of these reach the caller; the orchestrator absorbs each of them into fallback content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderFailure {
    #[error("Transient upstream failure: {0}")]
    Transient(String),

    #[error("Upstream rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Upstream rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Upstream unavailable after {attempts} attempt(s): {last_error}")]
    Unavailable { attempts: usize, last_error: String },

    #[error("Malformed upstream response: {0}")]
    Malformed(String),
}

impl ProviderFailure {
    /// Only transient failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderFailure::Transient(_))
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderFailure::Transient(_) => "transient",
            ProviderFailure::RateLimited(_) => "rate_limited",
            ProviderFailure::Rejected { .. } => "rejected",
            ProviderFailure::Unavailable { .. } => "unavailable",
            ProviderFailure::Malformed(_) => "malformed",
        }
    }
}

/// Crate-level errors for setup, configuration and the CLI surface.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
