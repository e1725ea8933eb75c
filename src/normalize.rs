//! Request normalization: required-field checks and whitespace trimming.
//!
//! Produces an owned, trimmed copy of the caller's request. Optional fields that trim to
//! nothing are dropped so downstream stages only ever see supplied context.

use crate::error::ValidationError;
use crate::types::{
    ExplorationSuggestionRequest, GenerationKind, GenerationRequest, PolicyDraftRequest,
    SummaryPolicyRequest,
};

/// Required text fields must be at least this long after trimming.
pub const MIN_FIELD_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSummary {
    pub state_text: String,
    pub policy_text: Option<String>,
    pub action_context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedExploration {
    pub action_id: String,
    pub state_text: String,
    pub policy_text: Option<String>,
    pub summary_policy_text: Option<String>,
    pub existing_exploration_notes: Option<String>,
    pub existing_metrics: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDraft {
    pub exploration_code: String,
    pub exploration_notes_text: String,
    pub metrics_text: String,
    pub action_title: String,
    pub state_text: String,
    /// Empty when the caller supplied none.
    pub similar_policies: Vec<String>,
}

/// A trimmed request whose required fields passed validation.
///
/// [`normalize_lossy`] also yields this type, but without the guarantee: required fields may be
/// empty there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedRequest {
    SummaryPolicy(NormalizedSummary),
    ExplorationSuggestions(NormalizedExploration),
    PolicyDraft(NormalizedDraft),
}

impl NormalizedRequest {
    pub fn kind(&self) -> GenerationKind {
        match self {
            NormalizedRequest::SummaryPolicy(_) => GenerationKind::SummaryPolicy,
            NormalizedRequest::ExplorationSuggestions(_) => GenerationKind::ExplorationSuggestions,
            NormalizedRequest::PolicyDraft(_) => GenerationKind::PolicyDraft,
        }
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(field: &'static str, value: &Option<String>) -> Result<String, ValidationError> {
    let raw = value
        .as_deref()
        .ok_or(ValidationError::MissingField { field })?;
    let text = raw.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    if text.chars().count() < MIN_FIELD_LEN {
        return Err(ValidationError::TooShort {
            field,
            min: MIN_FIELD_LEN,
        });
    }
    Ok(text.to_string())
}

fn trimmed_list(values: &Option<Vec<String>>) -> Vec<String> {
    values
        .iter()
        .flatten()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_summary(request: &SummaryPolicyRequest) -> Result<NormalizedSummary, ValidationError> {
    Ok(NormalizedSummary {
        state_text: required("state_text", &request.state_text)?,
        policy_text: trimmed(&request.policy_text),
        action_context: trimmed(&request.action_context),
    })
}

fn normalize_exploration(
    request: &ExplorationSuggestionRequest,
) -> Result<NormalizedExploration, ValidationError> {
    Ok(NormalizedExploration {
        action_id: required("action_id", &request.action_id)?,
        state_text: required("state_text", &request.state_text)?,
        policy_text: trimmed(&request.policy_text),
        summary_policy_text: trimmed(&request.summary_policy_text),
        existing_exploration_notes: trimmed(&request.existing_exploration_notes),
        existing_metrics: trimmed(&request.existing_metrics),
    })
}

fn normalize_draft(request: &PolicyDraftRequest) -> Result<NormalizedDraft, ValidationError> {
    let data = request
        .exploration_data
        .as_ref()
        .ok_or(ValidationError::MissingField {
            field: "exploration_data",
        })?;
    Ok(NormalizedDraft {
        exploration_code: required("exploration_data.exploration_code", &data.exploration_code)?,
        exploration_notes_text: required(
            "exploration_data.exploration_notes_text",
            &data.exploration_notes_text,
        )?,
        metrics_text: required("exploration_data.metrics_text", &data.metrics_text)?,
        action_title: required("exploration_data.action_title", &data.action_title)?,
        state_text: required("exploration_data.state_text", &data.state_text)?,
        similar_policies: trimmed_list(&request.similar_policies),
    })
}

/// Validate and trim a request. The caller's request is left untouched.
pub fn normalize(request: &GenerationRequest) -> Result<NormalizedRequest, ValidationError> {
    match request {
        GenerationRequest::SummaryPolicy(r) => normalize_summary(r).map(NormalizedRequest::SummaryPolicy),
        GenerationRequest::ExplorationSuggestions(r) => {
            normalize_exploration(r).map(NormalizedRequest::ExplorationSuggestions)
        }
        GenerationRequest::PolicyDraft(r) => normalize_draft(r).map(NormalizedRequest::PolicyDraft),
    }
}

/// Trim a request without validating it. Missing required fields become empty strings.
///
/// Only the invalid-input fallback path uses this; nothing built from it reaches the upstream.
pub fn normalize_lossy(request: &GenerationRequest) -> NormalizedRequest {
    let text = |value: &Option<String>| trimmed(value).unwrap_or_default();
    match request {
        GenerationRequest::SummaryPolicy(r) => NormalizedRequest::SummaryPolicy(NormalizedSummary {
            state_text: text(&r.state_text),
            policy_text: trimmed(&r.policy_text),
            action_context: trimmed(&r.action_context),
        }),
        GenerationRequest::ExplorationSuggestions(r) => {
            NormalizedRequest::ExplorationSuggestions(NormalizedExploration {
                action_id: text(&r.action_id),
                state_text: text(&r.state_text),
                policy_text: trimmed(&r.policy_text),
                summary_policy_text: trimmed(&r.summary_policy_text),
                existing_exploration_notes: trimmed(&r.existing_exploration_notes),
                existing_metrics: trimmed(&r.existing_metrics),
            })
        }
        GenerationRequest::PolicyDraft(r) => {
            let data = r.exploration_data.clone().unwrap_or_default();
            NormalizedRequest::PolicyDraft(NormalizedDraft {
                exploration_code: text(&data.exploration_code),
                exploration_notes_text: text(&data.exploration_notes_text),
                metrics_text: text(&data.metrics_text),
                action_title: text(&data.action_title),
                state_text: text(&data.state_text),
                similar_policies: trimmed_list(&r.similar_policies),
            })
        }
    }
}
