//! Configuration files driving generator behavior end to end

use super::test_utils::*;
use fieldgen::{
    ApiError, ConfigLoader, ContentGenerator, GenerationRequest, InvalidInputPolicy,
    SummaryPolicyRequest,
};
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("fieldgen.toml");
    fs::write(&path, body).unwrap();
    path
}

fn summary(state: &str) -> GenerationRequest {
    GenerationRequest::SummaryPolicy(SummaryPolicyRequest {
        state_text: Some(state.to_string()),
        ..Default::default()
    })
}

#[tokio::test]
async fn retry_settings_from_file_bound_upstream_attempts() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[retry]
max_retries = 0
backoff_ms = [10]
"#,
    );
    let config = ConfigLoader::load_from_file(&path).unwrap();
    let gen = generator_with(MockBackend::always(transient()), config);

    let result = gen.generate(&summary("Tractor service")).await.unwrap();
    assert!(result.is_fallback());
    assert_eq!(gen.backend().call_count(), 1);
}

#[tokio::test]
async fn invalid_input_policy_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "invalid_input = \"fallback\"\n");
    let config = ConfigLoader::load_from_file(&path).unwrap();
    assert_eq!(config.invalid_input, InvalidInputPolicy::Fallback);

    let gen = generator_with(MockBackend::always(reply(SUMMARY_JSON, 0.9)), config);
    assert_eq!(gen.invalid_input_policy(), InvalidInputPolicy::Fallback);
    let result = gen.generate(&summary("")).await.unwrap();
    assert!(result.confidence < 0.6);
}

#[test]
fn invalid_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
call_deadline_ms = 0

[upstream]
base_url = "ftp://example.invalid"
"#,
    );
    match ConfigLoader::load_from_file(&path) {
        Err(ApiError::ConfigError(msg)) => {
            assert!(msg.contains("base_url"));
            assert!(msg.contains("call_deadline_ms"));
        }
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(ConfigLoader::load_from_file(&dir.path().join("absent.toml")).is_err());
}

#[tokio::test]
async fn unreachable_upstream_degrades_to_fallback() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
call_deadline_ms = 5000

[upstream]
base_url = "http://127.0.0.1:9/api/ai"
connect_timeout_secs = 1
request_timeout_secs = 2

[retry]
max_retries = 0
backoff_ms = [10]
"#,
    );
    let config = ConfigLoader::load_from_file(&path).unwrap();
    let gen = ContentGenerator::from_config(&config).unwrap();

    let result = gen.generate(&summary("Testing rate limit handling")).await.unwrap();
    assert!(result.is_fallback());
    assert!(result.confidence < 0.7);
}
