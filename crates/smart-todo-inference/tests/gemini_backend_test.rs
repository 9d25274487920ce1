//! Gemini backend tests against a local wiremock server.

use serde_json::json;
use smart_todo_core::{Error, GenerationBackend};
use smart_todo_inference::gemini::{GeminiBackend, GeminiConfig};
use smart_todo_inference::AiClient;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> GeminiBackend {
    GeminiBackend::new(GeminiConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        model: "gemini-test".to_string(),
        timeout_seconds: 10,
    })
    .expect("Failed to create backend")
}

fn reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4, "totalTokenCount": 16}
    })
}

#[tokio::test]
async fn test_generate_sends_key_prompt_and_system_instruction() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "Plan my day"}]}],
            "systemInstruction": {"parts": [{"text": "Be brief"}]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("Start with email")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let text = backend
        .generate_with_system("Be brief", "Plan my day")
        .await
        .expect("generation should succeed");
    assert_eq!(text, "Start with email");
}

#[tokio::test]
async fn test_generate_maps_auth_failure_to_config_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
        })))
        .mount(&mock_server)
        .await;

    let err = backend_for(&mock_server)
        .generate("hello")
        .await
        .expect_err("403 must fail");
    match err {
        Error::Config(msg) => assert!(msg.contains("API key not valid")),
        other => panic!("expected Config error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generate_without_candidates_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        })))
        .mount(&mock_server)
        .await;

    let err = backend_for(&mock_server).generate("hello").await.unwrap_err();
    assert!(err.to_string().contains("SAFETY"));
}

#[tokio::test]
async fn test_health_check() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models/gemini-test"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "models/gemini-test"})))
        .mount(&mock_server)
        .await;

    assert!(backend_for(&mock_server).health_check().await.unwrap());

    let down = GeminiBackend::new(GeminiConfig {
        base_url: format!("{}/missing", mock_server.uri()),
        ..GeminiConfig::default()
    })
    .unwrap();
    assert!(!down.health_check().await.unwrap());
}

#[tokio::test]
async fn test_ai_client_end_to_end_over_gemini() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(
            "```json\n{\"suggested_category\": \"Health\", \"confidence\": 0.8, \"suggested_tags\": [\"doctor\"]}\n```",
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = AiClient::new(Arc::new(backend_for(&mock_server)));
    let result = client
        .categorize_task("Book dentist", "Tooth ache", &["Work".to_string()])
        .await;
    assert_eq!(result.suggested_category, "Health");
    assert_eq!(result.confidence, 0.8);
    assert_eq!(result.suggested_tags, vec!["doctor"]);
}

#[tokio::test]
async fn test_ai_client_falls_back_on_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = AiClient::new(Arc::new(backend_for(&mock_server)));
    let analysis = client
        .analyze_context("Team offsite next week", smart_todo_core::SourceType::Calendar)
        .await;
    assert!(analysis.keywords.is_empty());
    assert_eq!(analysis.relevance_score(), 0.5);
}
