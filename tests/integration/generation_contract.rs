//! Successful generation: schema-valid content, envelope metadata, prompt routing

use super::test_utils::*;
use fieldgen::{
    ExplorationData, ExplorationSuggestionRequest, GenerationContent, PolicyDraftRequest,
    SummaryPolicyRequest,
};

#[tokio::test]
async fn summary_result_carries_model_output_and_metadata() {
    let gen = generator(MockBackend::always(reply(SUMMARY_JSON, 0.88)));
    let result = gen
        .generate_summary_policy(SummaryPolicyRequest {
            state_text: Some("Cattle moved to the river paddock".into()),
            policy_text: Some("Rotational grazing policy".into()),
            action_context: Some("Autumn feed shortage".into()),
        })
        .await
        .unwrap();

    assert!(result.content.validate().is_ok());
    assert_eq!(result.model_used, "farm-gpt-1");
    assert_eq!(result.confidence, 0.88);
    assert_eq!(result.generated_at, fixed_clock().0);
    assert_eq!(
        result.context_used,
        vec!["policy_text".to_string(), "action_context".to_string()]
    );
    match result.content {
        GenerationContent::SummaryPolicy(s) => assert_eq!(s.key_points.len(), 2),
        other => panic!("unexpected content: {:?}", other),
    }
}

#[tokio::test]
async fn exploration_request_reaches_exploration_endpoint() {
    let backend = MockBackend::always(reply(EXPLORATION_JSON, 0.8));
    let gen = generator(backend);
    let result = gen
        .generate_exploration_suggestions(ExplorationSuggestionRequest {
            action_id: Some("ACT-42".into()),
            state_text: Some("Orchard rows drying out".into()),
            existing_metrics: Some("Soil moisture".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(matches!(result.content, GenerationContent::ExplorationSuggestions(_)));
    assert_eq!(result.context_used, vec!["existing_metrics".to_string()]);

    let calls = gen.backend().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].endpoint, "exploration-suggestions");
    assert_eq!(calls[0].field("action_id"), Some("ACT-42"));
    assert!(calls[0].field("policy_text").is_none());
}

#[tokio::test]
async fn policy_draft_passes_similar_policies_upstream() {
    let gen = generator(MockBackend::always(reply(DRAFT_JSON, 0.7)));
    let result = gen
        .generate_policy_draft(PolicyDraftRequest {
            exploration_data: Some(ExplorationData {
                exploration_code: Some("EXP-2024-07".into()),
                exploration_notes_text: Some("10cm mulch halved weed counts".into()),
                metrics_text: Some("Weed count per m2".into()),
                action_title: Some("Mulching".into()),
                state_text: Some("Young apple orchard".into()),
            }),
            similar_policies: Some(vec!["Weed control policy".into()]),
        })
        .await
        .unwrap();

    assert!(!result.is_fallback());
    assert_eq!(result.context_used, vec!["similar_policies".to_string()]);
    match &result.content {
        GenerationContent::PolicyDraft(d) => assert_eq!(d.title, "Mulching Policy"),
        other => panic!("unexpected content: {:?}", other),
    }
    let calls = gen.backend().calls();
    assert_eq!(calls[0].field("similar_policies"), Some("1. Weed control policy"));
}

#[tokio::test]
async fn reply_wrapped_in_prose_is_accepted() {
    let wrapped = format!("Here is the summary you asked for:\n```json\n{}\n```", SUMMARY_JSON);
    let gen = generator(MockBackend::always(reply(&wrapped, 0.9)));
    let result = gen
        .generate_summary_policy(SummaryPolicyRequest {
            state_text: Some("Sheep yards".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(!result.is_fallback());
}

#[tokio::test]
async fn consistent_results_for_structurally_similar_requests() {
    let gen = generator(MockBackend::always(reply(SUMMARY_JSON, 0.84)));
    let mut results = Vec::new();
    for location in ["north field", "south field", "east field"] {
        results.push(
            gen.generate_summary_policy(SummaryPolicyRequest {
                state_text: Some(format!("Preparing to spray the {}", location)),
                policy_text: Some("Chemical application procedures".into()),
                action_context: None,
            })
            .await
            .unwrap(),
        );
    }

    let model = &results[0].model_used;
    assert!(results.iter().all(|r| &r.model_used == model));
    for a in &results {
        for b in &results {
            assert!((a.confidence - b.confidence).abs() <= 0.2);
        }
    }
}
