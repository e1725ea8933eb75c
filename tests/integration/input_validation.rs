//! Invalid requests: rejected before any upstream call, or degraded under the fallback policy

use super::test_utils::*;
use fieldgen::fallback::contains_safety_keyword;
use fieldgen::{
    ExplorationData, ExplorationSuggestionRequest, InvalidInputPolicy, PolicyDraftRequest,
    SummaryPolicyRequest, ValidationError, FALLBACK_MODEL,
};

#[tokio::test]
async fn empty_state_text_is_rejected_without_upstream_call() {
    let gen = generator(MockBackend::always(reply(SUMMARY_JSON, 0.9)));
    let err = gen
        .generate_summary_policy(SummaryPolicyRequest {
            state_text: Some("   ".into()),
            policy_text: Some("Standard procedures".into()),
            action_context: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err, ValidationError::EmptyField { field: "state_text" });
    assert_eq!(gen.backend().call_count(), 0);
}

#[tokio::test]
async fn missing_and_short_fields_name_the_field() {
    let gen = generator(MockBackend::always(reply(EXPLORATION_JSON, 0.9)));

    let missing = gen
        .generate_exploration_suggestions(ExplorationSuggestionRequest {
            state_text: Some("Irrigation check".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(missing.field(), "action_id");

    let short = gen
        .generate_exploration_suggestions(ExplorationSuggestionRequest {
            action_id: Some("A".into()),
            state_text: Some("Irrigation check".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(short, ValidationError::TooShort { field: "action_id", .. }));
    assert_eq!(gen.backend().call_count(), 0);
}

#[tokio::test]
async fn draft_requires_exploration_data() {
    let gen = generator(MockBackend::always(reply(DRAFT_JSON, 0.9)));

    let err = gen
        .generate_policy_draft(PolicyDraftRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.field(), "exploration_data");

    let err = gen
        .generate_policy_draft(PolicyDraftRequest {
            exploration_data: Some(ExplorationData {
                exploration_code: Some("EXP-1".into()),
                exploration_notes_text: Some("Notes".into()),
                metrics_text: None,
                action_title: Some("Fencing".into()),
                state_text: Some("Boundary fence".into()),
            }),
            similar_policies: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.field(), "exploration_data.metrics_text");
}

#[tokio::test]
async fn fallback_policy_degrades_invalid_input() {
    let gen = generator_with_policy(
        MockBackend::always(reply(SUMMARY_JSON, 0.9)),
        InvalidInputPolicy::Fallback,
    );
    let result = gen
        .generate_summary_policy(SummaryPolicyRequest {
            state_text: Some("".into()),
            policy_text: Some("Standard procedures".into()),
            action_context: None,
        })
        .await
        .unwrap();

    assert_eq!(result.model_used, FALLBACK_MODEL);
    assert!(result.confidence > 0.0);
    assert!(result.confidence < 0.6);
    assert!(result.content.validate().is_ok());
    assert!(contains_safety_keyword(&result.content));
    assert_eq!(result.context_used, vec!["policy_text".to_string()]);
    assert_eq!(gen.backend().call_count(), 0);
}

#[tokio::test]
async fn fallback_policy_still_calls_upstream_for_valid_input() {
    let gen = generator_with_policy(
        MockBackend::always(reply(SUMMARY_JSON, 0.9)),
        InvalidInputPolicy::Fallback,
    );
    let result = gen
        .generate_summary_policy(SummaryPolicyRequest {
            state_text: Some("Shearing shed".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(!result.is_fallback());
    assert_eq!(gen.backend().call_count(), 1);
}

#[tokio::test]
async fn surrounding_whitespace_is_trimmed_before_sending() {
    let gen = generator(MockBackend::always(reply(SUMMARY_JSON, 0.9)));
    gen.generate_summary_policy(SummaryPolicyRequest {
        state_text: Some("  Calving paddock  ".into()),
        policy_text: Some("   ".into()),
        action_context: None,
    })
    .await
    .unwrap();

    let calls = gen.backend().calls();
    assert_eq!(calls[0].field("state_text"), Some("Calving paddock"));
    assert!(calls[0].field("policy_text").is_none());
}
