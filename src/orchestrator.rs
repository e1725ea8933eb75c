//! Generation orchestration: the single entry point per generation kind.
//!
//! Each call runs normalize, build prompt, call upstream (with retry), and parse. Any upstream
//! failure, whether rate limit, exhausted retries, hard rejection, malformed reply or an
//! expired deadline, is absorbed into fallback content. The only error a caller can see is a
//! [`ValidationError`], and only under [`InvalidInputPolicy::Reject`].

use crate::config::{GeneratorConfig, InvalidInputPolicy};
use crate::error::{ApiError, ProviderFailure, ValidationError};
use crate::fallback::{FallbackReason, FallbackSynthesizer};
use crate::normalize::{normalize, normalize_lossy, NormalizedRequest};
use crate::parse::{parse_content, ParsedGeneration};
use crate::prompt::{CallDescriptor, PromptBuilder};
use crate::provider::{GenerationBackend, GenerationClient, HttpBackend};
use crate::types::{
    ExplorationSuggestionRequest, GenerationContent, GenerationRequest, GenerationResult,
    PolicyDraftRequest, SummaryPolicyRequest, FALLBACK_MODEL,
};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Source of `generated_at` timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Turns generation requests into results. Holds only read-only configuration, so one
/// instance can serve any number of concurrent calls.
pub struct ContentGenerator<B, C = SystemClock> {
    client: GenerationClient<B>,
    clock: C,
    invalid_input: InvalidInputPolicy,
    default_deadline: Option<Duration>,
}

impl ContentGenerator<HttpBackend, SystemClock> {
    /// Generator talking HTTP to the configured upstream.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, ApiError> {
        let backend = HttpBackend::new(&config.upstream)?;
        Ok(Self::new(config, backend, SystemClock))
    }
}

impl<B: GenerationBackend, C: Clock> ContentGenerator<B, C> {
    pub fn new(config: &GeneratorConfig, backend: B, clock: C) -> Self {
        Self {
            client: GenerationClient::new(backend, config.retry.to_policy()),
            clock,
            invalid_input: config.invalid_input,
            default_deadline: config.call_deadline(),
        }
    }

    pub fn backend(&self) -> &B {
        self.client.backend()
    }

    pub fn invalid_input_policy(&self) -> InvalidInputPolicy {
        self.invalid_input
    }

    pub async fn generate_summary_policy(
        &self,
        request: SummaryPolicyRequest,
    ) -> Result<GenerationResult, ValidationError> {
        self.generate(&GenerationRequest::SummaryPolicy(request)).await
    }

    pub async fn generate_exploration_suggestions(
        &self,
        request: ExplorationSuggestionRequest,
    ) -> Result<GenerationResult, ValidationError> {
        self.generate(&GenerationRequest::ExplorationSuggestions(request))
            .await
    }

    pub async fn generate_policy_draft(
        &self,
        request: PolicyDraftRequest,
    ) -> Result<GenerationResult, ValidationError> {
        self.generate(&GenerationRequest::PolicyDraft(request)).await
    }

    /// Generate with the configured default deadline.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ValidationError> {
        self.generate_with_deadline(request, self.default_deadline)
            .await
    }

    /// Generate, giving up on upstream after `deadline` and answering with fallback content.
    pub async fn generate_with_deadline(
        &self,
        request: &GenerationRequest,
        deadline: Option<Duration>,
    ) -> Result<GenerationResult, ValidationError> {
        let kind = request.kind();
        let normalized = match normalize(request) {
            Ok(normalized) => normalized,
            Err(err) => {
                return match self.invalid_input {
                    InvalidInputPolicy::Reject => {
                        warn!(kind = kind.endpoint(), field = err.field(), error = %err, "Rejecting invalid generation request");
                        Err(err)
                    }
                    InvalidInputPolicy::Fallback => {
                        let lossy = normalize_lossy(request);
                        let context_used = PromptBuilder::context_labels(&lossy);
                        Ok(self.fallback(&lossy, FallbackReason::InvalidInput(err), context_used))
                    }
                };
            }
        };

        let descriptor = PromptBuilder::build(&normalized);
        let context_used = descriptor.context_labels();

        let outcome = match deadline {
            Some(limit) => match timeout(limit, self.attempt(&descriptor)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ProviderFailure::Unavailable {
                    attempts: 0,
                    last_error: format!("deadline of {}ms exceeded", limit.as_millis()),
                }),
            },
            None => self.attempt(&descriptor).await,
        };

        match outcome {
            Ok(parsed) => {
                info!(
                    kind = kind.endpoint(),
                    model = %parsed.model_name,
                    confidence = parsed.confidence,
                    "Generated content"
                );
                Ok(self.assemble(parsed.content, parsed.confidence, parsed.model_name, context_used))
            }
            Err(failure) => Ok(self.fallback(
                &normalized,
                FallbackReason::Upstream(failure),
                context_used,
            )),
        }
    }

    /// Run several requests concurrently. Results line up with `requests` by index.
    pub async fn generate_batch(
        &self,
        requests: &[GenerationRequest],
    ) -> Vec<Result<GenerationResult, ValidationError>> {
        join_all(requests.iter().map(|request| self.generate(request))).await
    }

    async fn attempt(&self, descriptor: &CallDescriptor) -> Result<ParsedGeneration, ProviderFailure> {
        let raw = self.client.call(descriptor).await?;
        parse_content(descriptor.kind, &raw)
    }

    fn fallback(
        &self,
        request: &NormalizedRequest,
        reason: FallbackReason,
        context_used: Vec<String>,
    ) -> GenerationResult {
        warn!(
            kind = request.kind().endpoint(),
            reason = reason.label(),
            detail = ?reason,
            "Serving fallback content"
        );
        let (content, confidence) = FallbackSynthesizer::synthesize(request, &reason);
        self.assemble(content, confidence, FALLBACK_MODEL.to_string(), context_used)
    }

    fn assemble(
        &self,
        content: GenerationContent,
        confidence: f64,
        model_used: String,
        context_used: Vec<String>,
    ) -> GenerationResult {
        GenerationResult {
            content,
            confidence,
            model_used,
            generated_at: self.clock.now(),
            context_used,
        }
    }
}
