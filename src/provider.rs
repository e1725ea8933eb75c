//! Generation Provider Abstraction
//!
//! The upstream text-generation service is reached through [`GenerationBackend`]. Backends
//! report failures as [`ProviderFailure`] so that nothing above this boundary inspects raw
//! HTTP errors. [`GenerationClient`] layers the bounded retry policy on top of any backend.

use crate::error::ProviderFailure;
use crate::prompt::CallDescriptor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod http;
pub mod retry;

pub use http::HttpBackend;
pub use retry::{GenerationClient, RetryPolicy};

/// Successful upstream reply, before the embedded payload is parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawGeneration {
    /// Model output; carries the structured payload somewhere inside.
    pub raw_content: String,
    pub confidence: f64,
    pub model_name: String,
}

/// One upstream call, no retries.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn send(&self, descriptor: &CallDescriptor) -> Result<RawGeneration, ProviderFailure>;

    /// Backend name for logs.
    fn backend_name(&self) -> &str;
}

#[async_trait]
impl<B: GenerationBackend + ?Sized> GenerationBackend for Arc<B> {
    async fn send(&self, descriptor: &CallDescriptor) -> Result<RawGeneration, ProviderFailure> {
        (**self).send(descriptor).await
    }

    fn backend_name(&self) -> &str {
        (**self).backend_name()
    }
}

/// Backend for running without an upstream service. Every call is unavailable, so every
/// result is fallback content.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineBackend;

#[async_trait]
impl GenerationBackend for OfflineBackend {
    async fn send(&self, descriptor: &CallDescriptor) -> Result<RawGeneration, ProviderFailure> {
        Err(ProviderFailure::Unavailable {
            attempts: 0,
            last_error: format!("offline mode, {} not requested", descriptor.endpoint),
        })
    }

    fn backend_name(&self) -> &str {
        "offline"
    }
}
