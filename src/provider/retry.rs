//! Bounded retry around a [`GenerationBackend`].

use crate::error::ProviderFailure;
use crate::prompt::CallDescriptor;
use crate::provider::{GenerationBackend, RawGeneration};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// How many times to retry a transient failure and how long to wait before each retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: usize,
    /// Delay before retry `n` is `backoff[n]`; the last entry repeats.
    pub backoff: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: vec![Duration::from_millis(250), Duration::from_millis(500)],
        }
    }
}

impl RetryPolicy {
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            backoff: Vec::new(),
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_retries + 1
    }

    /// Delay before the given retry (0-based).
    pub fn delay_for(&self, retry: usize) -> Duration {
        self.backoff
            .get(retry)
            .or_else(|| self.backoff.last())
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}

/// Issues upstream calls, retrying transient failures per [`RetryPolicy`].
///
/// Rate limits and hard rejections are returned on the first occurrence. Running out of
/// retries yields [`ProviderFailure::Unavailable`].
pub struct GenerationClient<B> {
    backend: B,
    policy: RetryPolicy,
}

impl<B: GenerationBackend> GenerationClient<B> {
    pub fn new(backend: B, policy: RetryPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn call(&self, descriptor: &CallDescriptor) -> Result<RawGeneration, ProviderFailure> {
        let mut attempt = 0usize;
        loop {
            attempt += 1;
            debug!(
                backend = self.backend.backend_name(),
                endpoint = %descriptor.endpoint,
                attempt,
                "Sending generation request"
            );

            let failure = match self.backend.send(descriptor).await {
                Ok(raw) => return Ok(raw),
                Err(failure) => failure,
            };

            if !failure.is_retryable() {
                warn!(
                    endpoint = %descriptor.endpoint,
                    attempt,
                    kind = failure.kind(),
                    error = %failure,
                    "Generation request failed, not retrying"
                );
                return Err(failure);
            }

            if attempt > self.policy.max_retries {
                warn!(
                    endpoint = %descriptor.endpoint,
                    attempts = attempt,
                    error = %failure,
                    "Generation retries exhausted"
                );
                return Err(ProviderFailure::Unavailable {
                    attempts: attempt,
                    last_error: failure.to_string(),
                });
            }

            let delay = self.policy.delay_for(attempt - 1);
            warn!(
                endpoint = %descriptor.endpoint,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "Transient generation failure, retrying"
            );
            sleep(delay).await;
        }
    }
}
