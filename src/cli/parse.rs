//! CLI parse: clap types for fieldgen. No behavior; definitions only.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// fieldgen - AI-assisted content generation for farm operations
#[derive(Parser, Debug)]
#[command(name = "fieldgen")]
#[command(about = "Generate policy summaries, exploration suggestions and policy drafts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Never call the upstream service; always answer with fallback content
    #[arg(long, global = true)]
    pub offline: bool,

    /// Per-call deadline in milliseconds (overrides config)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub deadline_ms: Option<u64>,

    /// Handling of invalid input (overrides config)
    #[arg(long, global = true, value_parser = ["reject", "fallback"])]
    pub invalid_input: Option<String>,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    pub format: String,

    /// Enable verbose logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize the policy that applies to an operational state
    Summary(SummaryArgs),
    /// Suggest how to explore an action
    Explore(ExploreArgs),
    /// Draft a policy from a completed exploration
    Draft(DraftArgs),
    /// Run one request, or an array of requests, from a JSON file
    Run {
        /// Path to the request JSON
        #[arg(long)]
        request: PathBuf,
    },
    /// Load and validate configuration, then print the effective settings
    CheckConfig,
}

#[derive(Args, Debug, Clone)]
pub struct SummaryArgs {
    #[arg(long)]
    pub state_text: Option<String>,
    #[arg(long)]
    pub policy_text: Option<String>,
    #[arg(long)]
    pub action_context: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ExploreArgs {
    #[arg(long)]
    pub action_id: Option<String>,
    #[arg(long)]
    pub state_text: Option<String>,
    #[arg(long)]
    pub policy_text: Option<String>,
    #[arg(long)]
    pub summary_policy_text: Option<String>,
    #[arg(long)]
    pub existing_exploration_notes: Option<String>,
    #[arg(long)]
    pub existing_metrics: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DraftArgs {
    #[arg(long)]
    pub exploration_code: Option<String>,
    #[arg(long)]
    pub exploration_notes_text: Option<String>,
    #[arg(long)]
    pub metrics_text: Option<String>,
    #[arg(long)]
    pub action_title: Option<String>,
    #[arg(long)]
    pub state_text: Option<String>,
    /// Related policy text (repeatable)
    #[arg(long = "similar-policy")]
    pub similar_policies: Vec<String>,
}
