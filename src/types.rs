//! Core types: generation requests, content schemas and the result envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Marker placed in `model_used` for deterministically synthesized content.
pub const FALLBACK_MODEL: &str = "fallback";

/// The three generation kinds, one upstream endpoint each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationKind {
    SummaryPolicy,
    ExplorationSuggestions,
    PolicyDraft,
}

impl GenerationKind {
    /// Endpoint slug appended to the upstream base URL.
    pub fn endpoint(self) -> &'static str {
        match self {
            GenerationKind::SummaryPolicy => "summary-policy",
            GenerationKind::ExplorationSuggestions => "exploration-suggestions",
            GenerationKind::PolicyDraft => "policy-draft",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GenerationKind::SummaryPolicy => "summary policy",
            GenerationKind::ExplorationSuggestions => "exploration suggestions",
            GenerationKind::PolicyDraft => "policy draft",
        }
    }
}

/// Context for summarizing the policy attached to an action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryPolicyRequest {
    /// Required. Free-text description of the current operational state.
    #[serde(default)]
    pub state_text: Option<String>,
    #[serde(default)]
    pub policy_text: Option<String>,
    #[serde(default)]
    pub action_context: Option<String>,
}

/// Context for suggesting how an action should be explored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplorationSuggestionRequest {
    /// Required.
    #[serde(default)]
    pub action_id: Option<String>,
    /// Required.
    #[serde(default)]
    pub state_text: Option<String>,
    #[serde(default)]
    pub policy_text: Option<String>,
    #[serde(default)]
    pub summary_policy_text: Option<String>,
    #[serde(default)]
    pub existing_exploration_notes: Option<String>,
    #[serde(default)]
    pub existing_metrics: Option<String>,
}

/// Exploration record a policy draft is derived from. Every field is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplorationData {
    #[serde(default)]
    pub exploration_code: Option<String>,
    #[serde(default)]
    pub exploration_notes_text: Option<String>,
    #[serde(default)]
    pub metrics_text: Option<String>,
    #[serde(default)]
    pub action_title: Option<String>,
    #[serde(default)]
    pub state_text: Option<String>,
}

/// Context for drafting a reusable policy from a finished exploration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyDraftRequest {
    /// Required.
    #[serde(default)]
    pub exploration_data: Option<ExplorationData>,
    #[serde(default)]
    pub similar_policies: Option<Vec<String>>,
}

/// A caller request, one variant per generation kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationRequest {
    SummaryPolicy(SummaryPolicyRequest),
    ExplorationSuggestions(ExplorationSuggestionRequest),
    PolicyDraft(PolicyDraftRequest),
}

impl GenerationRequest {
    pub fn kind(&self) -> GenerationKind {
        match self {
            GenerationRequest::SummaryPolicy(_) => GenerationKind::SummaryPolicy,
            GenerationRequest::ExplorationSuggestions(_) => GenerationKind::ExplorationSuggestions,
            GenerationRequest::PolicyDraft(_) => GenerationKind::PolicyDraft,
        }
    }
}

impl From<SummaryPolicyRequest> for GenerationRequest {
    fn from(request: SummaryPolicyRequest) -> Self {
        GenerationRequest::SummaryPolicy(request)
    }
}

impl From<ExplorationSuggestionRequest> for GenerationRequest {
    fn from(request: ExplorationSuggestionRequest) -> Self {
        GenerationRequest::ExplorationSuggestions(request)
    }
}

impl From<PolicyDraftRequest> for GenerationRequest {
    fn from(request: PolicyDraftRequest) -> Self {
        GenerationRequest::PolicyDraft(request)
    }
}

/// Generated summary of an action's policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryContent {
    pub summary_policy_text: String,
    pub key_points: Vec<String>,
    pub safety_considerations: Vec<String>,
}

/// Suggested exploration setup for an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationSuggestionContent {
    pub exploration_notes_text: String,
    pub metrics_text: String,
    pub suggested_measurements: Vec<String>,
    pub comparison_areas: Vec<String>,
    pub documentation_tips: Vec<String>,
}

/// Drafted policy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDraftContent {
    pub title: String,
    pub description_text: String,
    pub key_procedures: Vec<String>,
    pub safety_requirements: Vec<String>,
    pub documentation_requirements: Vec<String>,
    pub effective_conditions: Vec<String>,
}

/// Content produced for a request, matching its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationContent {
    SummaryPolicy(SummaryContent),
    ExplorationSuggestions(ExplorationSuggestionContent),
    PolicyDraft(PolicyDraftContent),
}

fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} must not be empty", field));
    }
    Ok(())
}

fn require_items(field: &str, items: &[String]) -> Result<(), String> {
    if items.is_empty() {
        return Err(format!("{} must contain at least one entry", field));
    }
    if items.iter().any(|item| item.trim().is_empty()) {
        return Err(format!("{} must not contain empty entries", field));
    }
    Ok(())
}

impl SummaryContent {
    pub fn validate(&self) -> Result<(), String> {
        require_text("summary_policy_text", &self.summary_policy_text)?;
        require_items("key_points", &self.key_points)?;
        require_items("safety_considerations", &self.safety_considerations)
    }
}

impl ExplorationSuggestionContent {
    pub fn validate(&self) -> Result<(), String> {
        require_text("exploration_notes_text", &self.exploration_notes_text)?;
        require_text("metrics_text", &self.metrics_text)?;
        require_items("suggested_measurements", &self.suggested_measurements)?;
        require_items("comparison_areas", &self.comparison_areas)?;
        require_items("documentation_tips", &self.documentation_tips)
    }
}

impl PolicyDraftContent {
    pub fn validate(&self) -> Result<(), String> {
        require_text("title", &self.title)?;
        require_text("description_text", &self.description_text)?;
        require_items("key_procedures", &self.key_procedures)?;
        require_items("safety_requirements", &self.safety_requirements)?;
        require_items("documentation_requirements", &self.documentation_requirements)?;
        require_items("effective_conditions", &self.effective_conditions)
    }
}

impl GenerationContent {
    pub fn kind(&self) -> GenerationKind {
        match self {
            GenerationContent::SummaryPolicy(_) => GenerationKind::SummaryPolicy,
            GenerationContent::ExplorationSuggestions(_) => GenerationKind::ExplorationSuggestions,
            GenerationContent::PolicyDraft(_) => GenerationKind::PolicyDraft,
        }
    }

    /// Check the non-emptiness invariants of the content schema.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            GenerationContent::SummaryPolicy(c) => c.validate(),
            GenerationContent::ExplorationSuggestions(c) => c.validate(),
            GenerationContent::PolicyDraft(c) => c.validate(),
        }
    }

    /// Every text fragment of the content, in schema order.
    pub fn text_fragments(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        match self {
            GenerationContent::SummaryPolicy(c) => {
                out.push(&c.summary_policy_text);
                out.extend(c.key_points.iter().map(String::as_str));
                out.extend(c.safety_considerations.iter().map(String::as_str));
            }
            GenerationContent::ExplorationSuggestions(c) => {
                out.push(&c.exploration_notes_text);
                out.push(&c.metrics_text);
                out.extend(c.suggested_measurements.iter().map(String::as_str));
                out.extend(c.comparison_areas.iter().map(String::as_str));
                out.extend(c.documentation_tips.iter().map(String::as_str));
            }
            GenerationContent::PolicyDraft(c) => {
                out.push(&c.title);
                out.push(&c.description_text);
                out.extend(c.key_procedures.iter().map(String::as_str));
                out.extend(c.safety_requirements.iter().map(String::as_str));
                out.extend(c.documentation_requirements.iter().map(String::as_str));
                out.extend(c.effective_conditions.iter().map(String::as_str));
            }
        }
        out
    }
}

/// Envelope handed back to the caller. Built once per call and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub content: GenerationContent,
    /// Self-reported trust in the content, in (0, 1].
    pub confidence: f64,
    pub model_used: String,
    pub generated_at: DateTime<Utc>,
    /// Labels of the context fields that were supplied for this call.
    pub context_used: Vec<String>,
}

impl GenerationResult {
    pub fn is_fallback(&self) -> bool {
        self.model_used == FALLBACK_MODEL
    }
}
