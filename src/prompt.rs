//! Prompt construction: maps a normalized request onto an upstream call descriptor.
//!
//! Output is a pure function of the input. Context fields are emitted in a fixed order per
//! generation kind, and optional fields the caller did not supply are left out entirely.

use crate::normalize::{NormalizedDraft, NormalizedExploration, NormalizedRequest, NormalizedSummary};
use crate::types::GenerationKind;
use serde::{Deserialize, Serialize};

const SUMMARY_INSTRUCTIONS: &str = "You are assisting a farm operations team. Summarize the policy \
that applies to the described operational state. Focus on what must be done, in what order, and \
which safety precautions apply. Reply with a single JSON object and nothing else, using exactly \
this shape: {\"summary_policy_text\": string, \"key_points\": [string], \
\"safety_considerations\": [string]}. Every string must be non-empty and every list must contain \
at least one entry.";

const EXPLORATION_INSTRUCTIONS: &str = "You are assisting a farm operations team in designing a \
structured exploration (a small field experiment) for an action. Propose what to test, which \
metrics to record, what to compare against and how to document the results. Reply with a single \
JSON object and nothing else, using exactly this shape: {\"exploration_notes_text\": string, \
\"metrics_text\": string, \"suggested_measurements\": [string], \"comparison_areas\": [string], \
\"documentation_tips\": [string]}. Every string must be non-empty and every list must contain at \
least one entry.";

const POLICY_DRAFT_INSTRUCTIONS: &str = "You are assisting a farm operations team in turning the \
results of a completed exploration into a reusable written policy. Use the exploration notes and \
metrics as evidence and stay consistent with any similar policies provided. Reply with a single \
JSON object and nothing else, using exactly this shape: {\"title\": string, \
\"description_text\": string, \"key_procedures\": [string], \"safety_requirements\": [string], \
\"documentation_requirements\": [string], \"effective_conditions\": [string]}. Every string must \
be non-empty and every list must contain at least one entry.";

/// One labelled excerpt of caller context sent upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextField {
    pub name: String,
    pub value: String,
    /// True for optional fields the caller chose to supply.
    #[serde(skip)]
    pub optional: bool,
}

/// Everything the generation client needs for one upstream call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallDescriptor {
    pub kind: GenerationKind,
    pub endpoint: String,
    pub instructions: String,
    pub context_fields: Vec<ContextField>,
}

impl CallDescriptor {
    /// Labels of the optional context fields that were supplied, in emission order.
    pub fn context_labels(&self) -> Vec<String> {
        self.context_fields
            .iter()
            .filter(|f| f.optional)
            .map(|f| f.name.clone())
            .collect()
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.context_fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}

/// Accumulates context fields for a descriptor.
struct FieldList(Vec<ContextField>);

impl FieldList {
    fn required(&mut self, name: &str, value: &str) -> &mut Self {
        self.0.push(ContextField {
            name: name.to_string(),
            value: value.to_string(),
            optional: false,
        });
        self
    }

    fn optional(&mut self, name: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value {
            self.0.push(ContextField {
                name: name.to_string(),
                value: value.to_string(),
                optional: true,
            });
        }
        self
    }
}

/// Builds upstream call descriptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(request: &NormalizedRequest) -> CallDescriptor {
        let kind = request.kind();
        let (instructions, fields) = match request {
            NormalizedRequest::SummaryPolicy(r) => (SUMMARY_INSTRUCTIONS, summary_fields(r)),
            NormalizedRequest::ExplorationSuggestions(r) => {
                (EXPLORATION_INSTRUCTIONS, exploration_fields(r))
            }
            NormalizedRequest::PolicyDraft(r) => (POLICY_DRAFT_INSTRUCTIONS, draft_fields(r)),
        };
        CallDescriptor {
            kind,
            endpoint: kind.endpoint().to_string(),
            instructions: instructions.to_string(),
            context_fields: fields,
        }
    }

    /// `context_used` labels for a request without building the whole descriptor.
    pub fn context_labels(request: &NormalizedRequest) -> Vec<String> {
        Self::build(request).context_labels()
    }
}

fn summary_fields(r: &NormalizedSummary) -> Vec<ContextField> {
    let mut fields = FieldList(Vec::new());
    fields
        .required("state_text", &r.state_text)
        .optional("policy_text", r.policy_text.as_deref())
        .optional("action_context", r.action_context.as_deref());
    fields.0
}

fn exploration_fields(r: &NormalizedExploration) -> Vec<ContextField> {
    let mut fields = FieldList(Vec::new());
    fields
        .required("action_id", &r.action_id)
        .required("state_text", &r.state_text)
        .optional("policy_text", r.policy_text.as_deref())
        .optional("summary_policy_text", r.summary_policy_text.as_deref())
        .optional(
            "existing_exploration_notes",
            r.existing_exploration_notes.as_deref(),
        )
        .optional("existing_metrics", r.existing_metrics.as_deref());
    fields.0
}

fn draft_fields(r: &NormalizedDraft) -> Vec<ContextField> {
    let similar = if r.similar_policies.is_empty() {
        None
    } else {
        Some(
            r.similar_policies
                .iter()
                .enumerate()
                .map(|(i, p)| format!("{}. {}", i + 1, p))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    };
    let mut fields = FieldList(Vec::new());
    fields
        .required("exploration_code", &r.exploration_code)
        .required("action_title", &r.action_title)
        .required("state_text", &r.state_text)
        .required("exploration_notes_text", &r.exploration_notes_text)
        .required("metrics_text", &r.metrics_text)
        .optional("similar_policies", similar.as_deref());
    fields.0
}
