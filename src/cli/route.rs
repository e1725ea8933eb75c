//! CLI route: builds requests from parsed arguments and dispatches them to the generator.

use crate::cli::parse::{Cli, Commands, DraftArgs, ExploreArgs, SummaryArgs};
use crate::cli::presentation::{
    format_batch_json, format_batch_text, format_config_check, format_result_json,
    format_result_text,
};
use crate::config::{GeneratorConfig, InvalidInputPolicy};
use crate::error::ApiError;
use crate::orchestrator::{ContentGenerator, SystemClock};
use crate::provider::{GenerationBackend, HttpBackend, OfflineBackend};
use crate::types::{
    ExplorationData, ExplorationSuggestionRequest, GenerationRequest, PolicyDraftRequest,
    SummaryPolicyRequest,
};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Fold CLI flags into the loaded configuration and validate the result.
pub fn apply_overrides(mut config: GeneratorConfig, cli: &Cli) -> Result<GeneratorConfig, ApiError> {
    if let Some(ms) = cli.deadline_ms {
        config.call_deadline_ms = Some(ms);
    }
    match cli.invalid_input.as_deref() {
        Some("reject") => config.invalid_input = InvalidInputPolicy::Reject,
        Some("fallback") => config.invalid_input = InvalidInputPolicy::Fallback,
        _ => {}
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }
    config.ensure_valid()?;
    Ok(config)
}

/// A request file holds either one request or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum RequestFile {
    Many(Vec<GenerationRequest>),
    One(GenerationRequest),
}

fn summary_request(args: &SummaryArgs) -> GenerationRequest {
    GenerationRequest::SummaryPolicy(SummaryPolicyRequest {
        state_text: args.state_text.clone(),
        policy_text: args.policy_text.clone(),
        action_context: args.action_context.clone(),
    })
}

fn explore_request(args: &ExploreArgs) -> GenerationRequest {
    GenerationRequest::ExplorationSuggestions(ExplorationSuggestionRequest {
        action_id: args.action_id.clone(),
        state_text: args.state_text.clone(),
        policy_text: args.policy_text.clone(),
        summary_policy_text: args.summary_policy_text.clone(),
        existing_exploration_notes: args.existing_exploration_notes.clone(),
        existing_metrics: args.existing_metrics.clone(),
    })
}

fn draft_request(args: &DraftArgs) -> GenerationRequest {
    let any_data = args.exploration_code.is_some()
        || args.exploration_notes_text.is_some()
        || args.metrics_text.is_some()
        || args.action_title.is_some()
        || args.state_text.is_some();
    GenerationRequest::PolicyDraft(PolicyDraftRequest {
        exploration_data: any_data.then(|| ExplorationData {
            exploration_code: args.exploration_code.clone(),
            exploration_notes_text: args.exploration_notes_text.clone(),
            metrics_text: args.metrics_text.clone(),
            action_title: args.action_title.clone(),
            state_text: args.state_text.clone(),
        }),
        similar_policies: if args.similar_policies.is_empty() {
            None
        } else {
            Some(args.similar_policies.clone())
        },
    })
}

/// Everything a command needs: effective configuration and a ready generator.
pub struct RunContext {
    config: GeneratorConfig,
    generator: ContentGenerator<Arc<dyn GenerationBackend>, SystemClock>,
}

impl RunContext {
    pub fn new(config: GeneratorConfig, offline: bool) -> Result<Self, ApiError> {
        let backend: Arc<dyn GenerationBackend> = if offline {
            Arc::new(OfflineBackend)
        } else {
            Arc::new(HttpBackend::new(&config.upstream)?)
        };
        info!(backend = backend.backend_name(), "Generator ready");
        let generator = ContentGenerator::new(&config, backend, SystemClock);
        Ok(Self { config, generator })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub async fn execute(&self, cli: &Cli) -> Result<String, ApiError> {
        let json = cli.format == "json";
        let deadline = self.config.call_deadline();
        let request = match &cli.command {
            Commands::CheckConfig => return Ok(format_config_check(&self.config)),
            Commands::Run { request } => match Self::read_request_file(request)? {
                RequestFile::One(request) => request,
                RequestFile::Many(requests) => {
                    let results = self.generator.generate_batch(&requests).await;
                    return Ok(if json {
                        format_batch_json(&results)
                    } else {
                        format_batch_text(&results)
                    });
                }
            },
            Commands::Summary(args) => summary_request(args),
            Commands::Explore(args) => explore_request(args),
            Commands::Draft(args) => draft_request(args),
        };

        let result = self
            .generator
            .generate_with_deadline(&request, deadline)
            .await?;
        Ok(if json {
            format_result_json(&result)
        } else {
            format_result_text(&result)
        })
    }

    fn read_request_file(path: &Path) -> Result<RequestFile, ApiError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
