//! Response parsing: pulls the structured payload out of a model reply and validates it.
//!
//! Decoding is strict. A reply that is missing a field, carries the wrong type, or violates a
//! non-emptiness invariant is rejected as a whole; nothing is partially trusted.

use crate::error::ProviderFailure;
use crate::provider::RawGeneration;
use crate::types::{
    ExplorationSuggestionContent, GenerationContent, GenerationKind, PolicyDraftContent,
    SummaryContent, FALLBACK_MODEL,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Content decoded from an upstream reply, with the upstream's own metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedGeneration {
    pub content: GenerationContent,
    pub confidence: f64,
    pub model_name: String,
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text.trim())
        .ok()
        .filter(Value::is_object)
}

/// Locate the JSON object embedded in free text.
///
/// Tries, in order: the whole text, a ```json fenced block, any fenced block, and the span
/// from the first `{` to the last `}`.
pub fn extract_json_payload(text: &str) -> Option<Value> {
    let t = text.trim().trim_matches('\u{feff}');

    if let Some(v) = parse_object(t) {
        return Some(v);
    }

    if let Some(start) = t.find("```json") {
        let body = &t[start + 7..];
        if let Some(end) = body.find("```") {
            if let Some(v) = parse_object(&body[..end]) {
                return Some(v);
            }
        }
    }

    if let Some(start) = t.find("```") {
        let body = &t[start + 3..];
        if let Some(end) = body.find("```") {
            // Skip a language tag on the fence line.
            let block = body[..end]
                .split_once('\n')
                .map(|(_, rest)| rest)
                .unwrap_or(&body[..end]);
            if let Some(v) = parse_object(block) {
                return Some(v);
            }
        }
    }

    if let (Some(i), Some(j)) = (t.find('{'), t.rfind('}')) {
        if i < j {
            if let Some(v) = parse_object(&t[i..=j]) {
                return Some(v);
            }
        }
    }

    None
}

fn decode<T: DeserializeOwned>(kind: GenerationKind, value: Value) -> Result<T, ProviderFailure> {
    serde_json::from_value(value).map_err(|e| {
        ProviderFailure::Malformed(format!("{} payload does not match schema: {}", kind.label(), e))
    })
}

/// Decode a raw reply into the content schema for `kind`.
pub fn parse_content(
    kind: GenerationKind,
    raw: &RawGeneration,
) -> Result<ParsedGeneration, ProviderFailure> {
    if !raw.confidence.is_finite() || raw.confidence <= 0.0 || raw.confidence > 1.0 {
        return Err(ProviderFailure::Malformed(format!(
            "confidence {} outside (0, 1]",
            raw.confidence
        )));
    }
    let model_name = raw.model_name.trim();
    if model_name.is_empty() {
        return Err(ProviderFailure::Malformed("empty model name".to_string()));
    }
    if model_name.eq_ignore_ascii_case(FALLBACK_MODEL) {
        return Err(ProviderFailure::Malformed(format!(
            "model name '{}' is reserved for synthesized content",
            model_name
        )));
    }

    let payload = extract_json_payload(&raw.raw_content).ok_or_else(|| {
        ProviderFailure::Malformed("no JSON object found in model output".to_string())
    })?;

    let content = match kind {
        GenerationKind::SummaryPolicy => {
            GenerationContent::SummaryPolicy(decode::<SummaryContent>(kind, payload)?)
        }
        GenerationKind::ExplorationSuggestions => GenerationContent::ExplorationSuggestions(
            decode::<ExplorationSuggestionContent>(kind, payload)?,
        ),
        GenerationKind::PolicyDraft => {
            GenerationContent::PolicyDraft(decode::<PolicyDraftContent>(kind, payload)?)
        }
    };

    content
        .validate()
        .map_err(|e| ProviderFailure::Malformed(format!("{} payload invalid: {}", kind.label(), e)))?;

    Ok(ParsedGeneration {
        content,
        confidence: raw.confidence,
        model_name: model_name.to_string(),
    })
}
