//! Fallback content synthesis.
//!
//! Builds schema-valid content from static templates and the caller's own text, with no network
//! access. Used whenever upstream generation cannot be trusted to have succeeded. Every piece of
//! content produced here mentions at least one of [`SAFETY_KEYWORDS`].

use crate::error::{ProviderFailure, ValidationError};
use crate::normalize::{NormalizedDraft, NormalizedExploration, NormalizedRequest, NormalizedSummary};
use crate::types::{
    ExplorationSuggestionContent, GenerationContent, PolicyDraftContent, SummaryContent,
};

/// Confidence reported for fallback content after an upstream failure.
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Confidence reported for fallback content answering a request that failed validation.
pub const DEGRADED_INPUT_CONFIDENCE: f64 = 0.3;

/// Fallback content always contains at least one of these (case-insensitive).
pub const SAFETY_KEYWORDS: [&str; 6] = [
    "safety",
    "protocol",
    "document",
    "procedure",
    "hazard",
    "record",
];

const EXCERPT_CHARS: usize = 160;

const BASE_SAFETY: &str = "Follow standard safety protocols for this operation";

/// Safety notes echoed when the caller's text mentions one of the trigger words.
const ECHOED_SAFETY: [(&[&str], &str); 6] = [
    (
        &["chemical", "pesticide", "herbicide", "fertilizer", "spray"],
        "Handle chemicals per label directions, observe re-entry intervals and store them securely",
    ),
    (
        &["equipment", "machinery", "tractor", "harvester", "chainsaw"],
        "Inspect equipment before use and follow lockout procedures during maintenance",
    ),
    (
        &["ppe", "glove", "respirator", "protective"],
        "Wear the personal protective equipment the procedure requires",
    ),
    (
        &["weather", "heat", "storm", "rain", "wind", "frost"],
        "Check weather conditions before starting and stop work if conditions become a hazard",
    ),
    (
        &["animal", "livestock", "cattle", "sheep", "pig", "poultry", "horse"],
        "Follow the safe animal handling protocol and keep escape routes clear",
    ),
    (
        &["water", "irrigation", "well", "pond"],
        "Check water sources and irrigation lines for contamination and leaks",
    ),
];

/// Why fallback content is being produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    Upstream(ProviderFailure),
    InvalidInput(ValidationError),
}

impl FallbackReason {
    pub fn label(&self) -> &'static str {
        match self {
            FallbackReason::Upstream(failure) => failure.kind(),
            FallbackReason::InvalidInput(_) => "invalid_input",
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            FallbackReason::Upstream(_) => FALLBACK_CONFIDENCE,
            FallbackReason::InvalidInput(_) => DEGRADED_INPUT_CONFIDENCE,
        }
    }
}

/// True when any text in `content` mentions a safety/documentation keyword.
pub fn contains_safety_keyword(content: &GenerationContent) -> bool {
    content.text_fragments().iter().any(|fragment| {
        let lower = fragment.to_lowercase();
        SAFETY_KEYWORDS.iter().any(|k| lower.contains(k))
    })
}

fn excerpt(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= EXCERPT_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(EXCERPT_CHARS).collect();
    format!("{}...", cut.trim_end())
}

fn or_default<'a>(text: &'a str, default: &'a str) -> &'a str {
    if text.trim().is_empty() {
        default
    } else {
        text
    }
}

/// Close `text` with a period unless it already ends a sentence.
fn sentence(text: String) -> String {
    if text.ends_with(|c: char| matches!(c, '.' | '!' | '?')) {
        text
    } else {
        format!("{}.", text)
    }
}

/// True when `word` is `trigger` or its plain plural.
fn matches_trigger(word: &str, trigger: &str) -> bool {
    word == trigger || word.strip_suffix('s') == Some(trigger)
}

/// Base safety note plus any notes triggered by whole words in the given caller texts.
fn safety_notes<'a>(texts: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let words: Vec<String> = texts
        .into_iter()
        .flat_map(|text| text.split(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect();
    let mut notes = vec![BASE_SAFETY.to_string()];
    for (triggers, note) in ECHOED_SAFETY {
        let hit = words
            .iter()
            .any(|word| triggers.iter().any(|t| matches_trigger(word, t)));
        if hit {
            notes.push(note.to_string());
        }
    }
    notes
}

/// Synthesizes fallback content. Stateless and infallible.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSynthesizer;

impl FallbackSynthesizer {
    /// Content and confidence for `request`.
    pub fn synthesize(request: &NormalizedRequest, reason: &FallbackReason) -> (GenerationContent, f64) {
        let content = match request {
            NormalizedRequest::SummaryPolicy(r) => GenerationContent::SummaryPolicy(summary(r)),
            NormalizedRequest::ExplorationSuggestions(r) => {
                GenerationContent::ExplorationSuggestions(exploration(r))
            }
            NormalizedRequest::PolicyDraft(r) => GenerationContent::PolicyDraft(draft(r)),
        };
        (content, reason.confidence())
    }
}

fn summary(r: &NormalizedSummary) -> SummaryContent {
    let state = excerpt(or_default(&r.state_text, "the current operation"));
    let summary_policy_text = match &r.policy_text {
        Some(policy) => format!(
            "{} Apply this policy to {} and follow the documented safety procedures.",
            sentence(excerpt(policy)),
            state
        ),
        None => format!(
            "Follow standard operating procedures and safety protocols for {}.",
            state
        ),
    };

    let mut key_points = vec![format!("Review the current state before starting: {}", state)];
    if let Some(policy) = &r.policy_text {
        key_points.push(format!("Apply the linked policy: {}", excerpt(policy)));
    }
    if let Some(context) = &r.action_context {
        key_points.push(format!("Account for the action context: {}", excerpt(context)));
    }
    key_points.push("Document observations and any deviations from the procedure".to_string());

    let texts = [Some(r.state_text.as_str()), r.policy_text.as_deref(), r.action_context.as_deref()];
    SummaryContent {
        summary_policy_text,
        key_points,
        safety_considerations: safety_notes(texts.into_iter().flatten()),
    }
}

fn exploration(r: &NormalizedExploration) -> ExplorationSuggestionContent {
    let action = or_default(&r.action_id, "this action");
    let state = excerpt(or_default(&r.state_text, "current conditions"));

    let exploration_notes_text = format!(
        "Exploration for action {}: compare the current approach with one controlled change under {}. \
         Record conditions, steps taken and outcomes following the documentation protocol.",
        action, state
    );
    let metrics_text = match &r.existing_metrics {
        Some(metrics) => format!(
            "Continue tracking {} and add time spent, cost, and yield or quality observations.",
            excerpt(metrics)
        ),
        None => "Track time spent, cost, yield or quality, and any safety incidents.".to_string(),
    };

    let mut comparison_areas = vec![
        "Current procedure versus the proposed change".to_string(),
        "Results under different conditions such as weather, season and location".to_string(),
    ];
    if r.policy_text.is_some() || r.summary_policy_text.is_some() {
        comparison_areas.push("Observed practice versus the written policy".to_string());
    }

    let mut documentation_tips = vec![
        "Document the date, location and conditions for every observation".to_string(),
        "Record deviations from the safety protocol as soon as they happen".to_string(),
        "Attach photos or measurements wherever possible".to_string(),
    ];
    if let Some(notes) = &r.existing_exploration_notes {
        documentation_tips.push(format!("Build on the existing notes: {}", excerpt(notes)));
    }

    ExplorationSuggestionContent {
        exploration_notes_text,
        metrics_text,
        suggested_measurements: vec![
            "Time required to complete the action".to_string(),
            "Inputs used, such as materials, water and fuel".to_string(),
            "Outcome quality or yield".to_string(),
            "Safety incidents or near misses".to_string(),
        ],
        comparison_areas,
        documentation_tips,
    }
}

fn draft(r: &NormalizedDraft) -> PolicyDraftContent {
    let code = or_default(&r.exploration_code, "unreferenced exploration");
    let title = if r.action_title.trim().is_empty() {
        "Draft Operating Policy".to_string()
    } else {
        format!("{} Policy", r.action_title)
    };
    let state = excerpt(or_default(&r.state_text, "the recorded operating conditions"));
    let notes = excerpt(or_default(&r.exploration_notes_text, "no findings recorded"));
    let metrics = excerpt(or_default(&r.metrics_text, "no metrics recorded"));

    let description_text = format!(
        "Draft policy derived from exploration {}. Findings: {} Metrics: {} \
         Review this draft against the safety procedures before adoption.",
        code, notes, metrics
    );

    let mut key_procedures = vec![
        format!("Prepare by reviewing current conditions: {}", state),
        format!("Carry out the procedure validated in exploration {}", code),
        "Verify results against the recorded metrics".to_string(),
    ];
    if let Some(related) = r.similar_policies.first() {
        key_procedures.push(format!("Keep consistent with the related policy: {}", excerpt(related)));
    }

    let texts = [
        r.state_text.as_str(),
        r.exploration_notes_text.as_str(),
        r.metrics_text.as_str(),
        r.action_title.as_str(),
    ];

    PolicyDraftContent {
        title,
        description_text,
        key_procedures,
        safety_requirements: safety_notes(texts),
        documentation_requirements: vec![
            "Document each application of this policy with the date and conditions".to_string(),
            format!("Record the tracked metrics: {}", metrics),
            "Keep records of the safety checks performed".to_string(),
        ],
        effective_conditions: vec![
            format!("Applies when conditions match: {}", state),
            "Review after the next season or whenever conditions change".to_string(),
        ],
    }
}
