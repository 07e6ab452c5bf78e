mod common;

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use espagnol_facile_api::{
    config::GeminiConfig,
    models::GenerateRequest,
    services::gemini_service::{ExerciseProvider, GeminiService},
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Captured {
    model_path: String,
    api_key: Option<String>,
    body: Value,
}

/// Gemini stand-in replying with `reply` and recording the last call.
async fn stub_gemini(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Option<Captured>>>) {
    let captured: Arc<Mutex<Option<Captured>>> = Arc::new(Mutex::new(None));
    let recorder = captured.clone();

    let router = Router::new().route(
        "/v1beta/models/{model}",
        post(
            move |Path(model_path): Path<String>, headers: HeaderMap, Json(body): Json<Value>| {
                let recorder = recorder.clone();
                let reply = reply.clone();
                async move {
                    *recorder.lock().unwrap() = Some(Captured {
                        model_path,
                        api_key: headers
                            .get("x-goog-api-key")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string),
                        body,
                    });
                    (status, Json(reply)).into_response()
                }
            },
        ),
    );

    (common::spawn_server(router).await, captured)
}

fn service(base_url: String) -> GeminiService {
    let mut config = GeminiConfig::with_api_key("stub-key");
    config.base_url = base_url;
    config.model = "gemini-test".to_string();
    GeminiService::new(&config).unwrap()
}

fn request() -> GenerateRequest {
    GenerateRequest {
        topic: "un des sujets suivants: Le Futur Simple".to_string(),
        level: "Baccalauréat".to_string(),
        difficulty: "Difficile".to_string(),
    }
}

fn candidate_text(text: &str) -> Value {
    json!({
        "candidates": [
            { "content": { "role": "model", "parts": [ { "text": text } ] } }
        ]
    })
}

#[tokio::test]
async fn test_generate_sends_schema_and_parses_exercise() {
    common::init_tracing();
    let exercise = serde_json::to_string(&common::sample_exercise()).unwrap();
    let (base_url, captured) = stub_gemini(StatusCode::OK, candidate_text(&exercise)).await;

    let result = service(base_url).generate(&request()).await.unwrap();
    assert_eq!(result, common::sample_exercise());

    let call = captured.lock().unwrap().clone().unwrap();
    assert_eq!(call.model_path, "gemini-test:generateContent");
    assert_eq!(call.api_key.as_deref(), Some("stub-key"));

    let body = call.body;
    assert_eq!(body["contents"][0]["role"], "user");
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("\"Difficile\""));
    assert!(prompt.contains("Le Futur Simple"));
    let instruction = body["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
    assert!(instruction.contains("Baccalauréat"));
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    assert_eq!(
        body["generationConfig"]["responseSchema"]["required"],
        json!(["title", "questions"])
    );
}

#[tokio::test]
async fn test_upstream_error_status_fails() {
    let (base_url, _) = stub_gemini(
        StatusCode::TOO_MANY_REQUESTS,
        json!({ "error": { "message": "quota exceeded" } }),
    )
    .await;

    let err = service(base_url).generate(&request()).await.unwrap_err();
    assert!(format!("{:#}", err).contains("429"));
}

#[tokio::test]
async fn test_non_exercise_text_fails() {
    let (base_url, _) = stub_gemini(StatusCode::OK, candidate_text("Désolé, je ne peux pas.")).await;
    assert!(service(base_url).generate(&request()).await.is_err());

    let (base_url, _) = stub_gemini(StatusCode::OK, json!({ "candidates": [] })).await;
    assert!(service(base_url).generate(&request()).await.is_err());
}

#[tokio::test]
async fn test_unreachable_upstream_fails() {
    let base_url = common::closed_port_url().await;
    let err = service(base_url).generate(&request()).await.unwrap_err();
    assert!(err.to_string().contains("Failed to call Gemini API"));
}
