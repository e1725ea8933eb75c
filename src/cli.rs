//! CLI domain: parse, route, output, and presentation only.
//! Generation itself lives in the orchestrator; routes only assemble requests and format results.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, DraftArgs, ExploreArgs, SummaryArgs};
pub use presentation::{
    format_batch_json, format_batch_text, format_config_check, format_result_json,
    format_result_text,
};
pub use route::{apply_overrides, RunContext};
