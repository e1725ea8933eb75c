//! HTTP backend for the upstream generation service.
//!
//! Posts a [`CallDescriptor`] as JSON to `{base_url}/{endpoint}` and expects
//! `{ "rawContent": string, "confidence": number, "modelName": string }` back.

use crate::config::UpstreamConfig;
use crate::error::{ApiError, ProviderFailure};
use crate::prompt::CallDescriptor;
use crate::provider::{GenerationBackend, RawGeneration};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationEnvelope {
    #[serde(alias = "raw_content")]
    raw_content: String,
    confidence: f64,
    #[serde(alias = "model_name")]
    model_name: String,
}

/// Map a non-success HTTP status onto the failure taxonomy.
pub(crate) fn map_status(status: u16, body: &str) -> ProviderFailure {
    match status {
        429 => ProviderFailure::RateLimited(format!("Rate limit exceeded: {}", body)),
        408 | 500..=599 => {
            ProviderFailure::Transient(format!("Upstream returned {}: {}", status, body))
        }
        _ => ProviderFailure::Rejected {
            status,
            message: body.to_string(),
        },
    }
}

fn map_http_error(error: reqwest::Error) -> ProviderFailure {
    if let Some(status) = error.status() {
        map_status(status.as_u16(), &error.to_string())
    } else if error.is_timeout() {
        ProviderFailure::Transient(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ProviderFailure::Transient(format!("Connection error: {}", error))
    } else if error.is_decode() {
        ProviderFailure::Malformed(format!("Failed to decode response: {}", error))
    } else {
        ProviderFailure::Transient(format!("HTTP error: {}", error))
    }
}

/// Talks to the upstream service over HTTP.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &UpstreamConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::ProviderError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint_url(&self, descriptor: &CallDescriptor) -> String {
        format!("{}/{}", self.base_url, descriptor.endpoint)
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    async fn send(&self, descriptor: &CallDescriptor) -> Result<RawGeneration, ProviderFailure> {
        let url = self.endpoint_url(descriptor);
        debug!(url = %url, fields = descriptor.context_fields.len(), "Posting generation request");

        let mut request = self.client.post(&url).json(descriptor);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(map_http_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_status(status.as_u16(), &body));
        }

        let body = response.text().await.map_err(map_http_error)?;
        let envelope: GenerationEnvelope = serde_json::from_str(&body)
            .map_err(|e| ProviderFailure::Malformed(format!("Invalid response envelope: {}", e)))?;

        Ok(RawGeneration {
            raw_content: envelope.raw_content,
            confidence: envelope.confidence,
            model_name: envelope.model_name,
        })
    }

    fn backend_name(&self) -> &str {
        "http"
    }
}
