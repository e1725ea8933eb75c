//! fieldgen: resilient AI content generation for farm operations tracking
//!
//! Turns free-text operational context (the state of an action, its policy, exploration notes
//! and metrics) into structured content: policy summaries, exploration suggestions and policy
//! drafts. The upstream text-generation service is treated as unreliable; whenever it fails,
//! deterministic fallback content is returned instead.

pub mod cli;
pub mod config;
pub mod error;
pub mod fallback;
pub mod logging;
pub mod normalize;
pub mod orchestrator;
pub mod parse;
pub mod prompt;
pub mod provider;
pub mod types;

pub use config::{ConfigLoader, GeneratorConfig, InvalidInputPolicy};
pub use error::{ApiError, ProviderFailure, ValidationError};
pub use orchestrator::{Clock, ContentGenerator, FixedClock, SystemClock};
pub use types::{
    ExplorationData, ExplorationSuggestionRequest, GenerationContent, GenerationKind,
    GenerationRequest, GenerationResult, PolicyDraftRequest, SummaryPolicyRequest,
    FALLBACK_MODEL,
};
