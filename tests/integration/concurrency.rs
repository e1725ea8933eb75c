//! Concurrent calls and per-call deadlines

use super::test_utils::*;
use fieldgen::{GenerationRequest, GeneratorConfig, SummaryPolicyRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn summary(state: &str) -> GenerationRequest {
    GenerationRequest::SummaryPolicy(SummaryPolicyRequest {
        state_text: Some(state.to_string()),
        ..Default::default()
    })
}

#[tokio::test(start_paused = true)]
async fn concurrent_calls_do_not_serialize() {
    let gen = generator(
        MockBackend::always(reply(SUMMARY_JSON, 0.9)).with_delay(Duration::from_millis(100)),
    );
    let requests: Vec<_> = (0..5).map(|i| summary(&format!("Paddock {}", i))).collect();

    let start = Instant::now();
    let results = gen.generate_batch(&requests).await;

    assert!(start.elapsed() < Duration::from_millis(200));
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| matches!(r, Ok(result) if !result.is_fallback())));
    assert_eq!(gen.backend().call_count(), 5);
}

#[tokio::test]
async fn shared_generator_serves_spawned_tasks() {
    let gen = Arc::new(generator(MockBackend::always(rate_limited())));
    let mut handles = Vec::new();
    for i in 0..4 {
        let gen = Arc::clone(&gen);
        handles.push(tokio::spawn(async move {
            gen.generate(&summary(&format!("Silo {}", i))).await
        }));
    }
    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert!(result.is_fallback());
    }
    assert_eq!(gen.backend().call_count(), 4);
}

#[tokio::test(start_paused = true)]
async fn expired_deadline_answers_with_fallback() {
    let gen = generator(
        MockBackend::always(reply(SUMMARY_JSON, 0.9)).with_delay(Duration::from_secs(30)),
    );
    let start = Instant::now();
    let result = gen
        .generate_with_deadline(&summary("Harvest crew"), Some(Duration::from_millis(500)))
        .await
        .unwrap();

    assert!(result.is_fallback());
    assert!(result.confidence < 0.7);
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn configured_deadline_applies_to_every_call() {
    let config = GeneratorConfig {
        call_deadline_ms: Some(200),
        ..GeneratorConfig::default()
    };
    let gen = generator_with(
        MockBackend::always(reply(SUMMARY_JSON, 0.9)).with_delay(Duration::from_secs(5)),
        config,
    );
    let results = gen
        .generate_batch(&[summary("Dairy shed"), summary("Hay barn")])
        .await;
    for result in results {
        assert!(result.unwrap().is_fallback());
    }
}

#[tokio::test(start_paused = true)]
async fn deadline_generous_enough_keeps_model_output() {
    let gen = generator(
        MockBackend::always(reply(SUMMARY_JSON, 0.9)).with_delay(Duration::from_millis(50)),
    );
    let result = gen
        .generate_with_deadline(&summary("Feed store"), Some(Duration::from_secs(2)))
        .await
        .unwrap();
    assert!(!result.is_fallback());
}

#[tokio::test]
async fn batch_keeps_request_order_and_rejections() {
    let gen = generator(MockBackend::always(reply(SUMMARY_JSON, 0.9)));
    let results = gen
        .generate_batch(&[summary("Woolshed"), summary(" "), summary("Pump house")])
        .await;
    assert!(results[0].is_ok());
    assert_eq!(results[1].as_ref().unwrap_err().field(), "state_text");
    assert!(results[2].is_ok());
}
