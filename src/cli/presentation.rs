//! Result presentation: text tables and JSON.

use crate::config::GeneratorConfig;
use crate::error::ValidationError;
use crate::types::{GenerationContent, GenerationResult};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

fn bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn content_rows(content: &GenerationContent) -> Vec<(&'static str, String)> {
    match content {
        GenerationContent::SummaryPolicy(c) => vec![
            ("Summary", c.summary_policy_text.clone()),
            ("Key points", bullets(&c.key_points)),
            ("Safety", bullets(&c.safety_considerations)),
        ],
        GenerationContent::ExplorationSuggestions(c) => vec![
            ("Exploration notes", c.exploration_notes_text.clone()),
            ("Metrics", c.metrics_text.clone()),
            ("Measurements", bullets(&c.suggested_measurements)),
            ("Comparisons", bullets(&c.comparison_areas)),
            ("Documentation", bullets(&c.documentation_tips)),
        ],
        GenerationContent::PolicyDraft(c) => vec![
            ("Title", c.title.clone()),
            ("Description", c.description_text.clone()),
            ("Procedures", bullets(&c.key_procedures)),
            ("Safety", bullets(&c.safety_requirements)),
            ("Documentation", bullets(&c.documentation_requirements)),
            ("Conditions", bullets(&c.effective_conditions)),
        ],
    }
}

pub fn format_result_text(result: &GenerationResult) -> String {
    let model = if result.is_fallback() {
        format!("{}", result.model_used.yellow().bold())
    } else {
        result.model_used.clone()
    };
    let mut out = format!(
        "{}\n\n  Model: {}\n  Confidence: {:.2}\n  Generated: {}\n  Context used: {}\n\n",
        result.content.kind().label().bold().underline(),
        model,
        result.confidence,
        result.generated_at.to_rfc3339(),
        if result.context_used.is_empty() {
            "(none)".to_string()
        } else {
            result.context_used.join(", ")
        }
    );

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Field", "Content"]);
    for (field, value) in content_rows(&result.content) {
        table.add_row(vec![field.to_string(), value]);
    }
    out.push_str(&table.to_string());
    out
}

pub fn format_result_json(result: &GenerationResult) -> String {
    serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_batch_text(results: &[Result<GenerationResult, ValidationError>]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(index, result)| match result {
            Ok(result) => format!("[{}] {}", index, format_result_text(result)),
            Err(err) => format!("[{}] {} {}", index, "rejected:".red(), err),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn format_batch_json(results: &[Result<GenerationResult, ValidationError>]) -> String {
    let entries: Vec<_> = results
        .iter()
        .enumerate()
        .map(|(index, result)| match result {
            Ok(result) => json!({ "index": index, "result": result }),
            Err(err) => json!({ "index": index, "error": err.to_string(), "field": err.field() }),
        })
        .collect();
    serde_json::to_string_pretty(&entries).unwrap_or_else(|_| "[]".to_string())
}

pub fn format_config_check(config: &GeneratorConfig) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec!["upstream.base_url".to_string(), config.upstream.base_url.clone()]);
    table.add_row(vec![
        "upstream.api_key".to_string(),
        if config.upstream.api_key.is_some() { "(set)" } else { "(none)" }.to_string(),
    ]);
    table.add_row(vec![
        "upstream.request_timeout_secs".to_string(),
        config.upstream.request_timeout_secs.to_string(),
    ]);
    table.add_row(vec!["retry.max_retries".to_string(), config.retry.max_retries.to_string()]);
    table.add_row(vec![
        "retry.backoff_ms".to_string(),
        format!("{:?}", config.retry.backoff_ms),
    ]);
    table.add_row(vec![
        "invalid_input".to_string(),
        format!("{:?}", config.invalid_input).to_lowercase(),
    ]);
    table.add_row(vec![
        "call_deadline_ms".to_string(),
        config
            .call_deadline_ms
            .map(|ms| ms.to_string())
            .unwrap_or_else(|| "(none)".to_string()),
    ]);
    format!("Configuration OK\n\n{}", table)
}
