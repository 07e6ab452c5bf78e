mod common;

use axum::{http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use espagnol_facile_api::{
    client::{ExerciseGenerator, GenerationClient, GenerationError},
    models::{Difficulty, ExerciseDefinition},
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use common::FakeProvider;

/// Backend stand-in answering `/api/generate` with a fixed status and body.
async fn stub_backend(status: StatusCode, body: &'static str) -> String {
    let router = Router::new().route(
        "/api/generate",
        post(move || async move { (status, [("content-type", "application/json")], body) }),
    );
    common::spawn_server(router).await
}

async fn request(base_url: &str) -> Result<ExerciseDefinition, GenerationError> {
    GenerationClient::new(base_url)
        .unwrap()
        .request_exercise("un des sujets suivants: Le Futur", "Baccalauréat", Difficulty::Medium)
        .await
}

#[tokio::test]
async fn test_success_returns_exercise_and_sends_triple() {
    let seen: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let recorder = seen.clone();
    let router = Router::new().route(
        "/api/generate",
        post(move |Json(body): Json<Value>| {
            let recorder = recorder.clone();
            async move {
                *recorder.lock().unwrap() = Some(body);
                Json(json!({
                    "title": "Le Futur Simple",
                    "questions": [
                        { "id": "q1", "type": "fill-in-the-blank", "question": "Yo (hablar) ____.", "answer": "hablaré" }
                    ]
                }))
                .into_response()
            }
        }),
    );
    let base_url = common::spawn_server(router).await;

    let exercise = request(&base_url).await.unwrap();

    assert_eq!(exercise.title, "Le Futur Simple");
    assert_eq!(exercise.questions.len(), 1);
    assert_eq!(
        seen.lock().unwrap().clone().unwrap(),
        json!({
            "topic": "un des sujets suivants: Le Futur",
            "level": "Baccalauréat",
            "difficulty": "Moyen"
        })
    );
}

#[tokio::test]
async fn test_error_body_message_is_surfaced() {
    let base_url = stub_backend(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"error":"quota exceeded"}"#,
    )
    .await;

    let err = request(&base_url).await.unwrap_err();

    assert_eq!(err, GenerationError::Upstream("quota exceeded".to_string()));
    assert!(err.to_string().contains("quota exceeded"));
}

#[tokio::test]
async fn test_unparseable_error_body_falls_back_to_generic_message() {
    let base_url = stub_backend(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>").await;
    assert_eq!(request(&base_url).await.unwrap_err(), GenerationError::Server);

    let base_url = stub_backend(StatusCode::INTERNAL_SERVER_ERROR, r#"{"message":"boom"}"#).await;
    let err = request(&base_url).await.unwrap_err();
    assert_eq!(err, GenerationError::Server);
    assert_eq!(
        err.to_string(),
        "Le serveur a rencontré une erreur. Veuillez réessayer plus tard."
    );
}

#[tokio::test]
async fn test_empty_exercise_is_rejected() {
    let base_url = stub_backend(StatusCode::OK, r#"{"title":"","questions":[]}"#).await;
    assert_eq!(
        request(&base_url).await.unwrap_err(),
        GenerationError::InvalidResponse
    );
}

#[tokio::test]
async fn test_non_json_success_body_is_invalid() {
    let base_url = stub_backend(StatusCode::OK, "not json at all").await;
    assert_eq!(
        request(&base_url).await.unwrap_err(),
        GenerationError::InvalidResponse
    );

    // Passes the shape check but a question has an unknown type
    let base_url = stub_backend(
        StatusCode::OK,
        r#"{"title":"T","questions":[{"id":"q1","type":"essay","question":"?","answer":"a"}]}"#,
    )
    .await;
    assert_eq!(
        request(&base_url).await.unwrap_err(),
        GenerationError::InvalidResponse
    );
}

#[tokio::test]
async fn test_unreachable_server_is_a_connection_error() {
    let base_url = common::closed_port_url().await;

    let err = request(&base_url).await.unwrap_err();

    assert_eq!(err, GenerationError::Connection);
    assert!(err.to_string().starts_with("La connexion au serveur a échoué"));
}

#[tokio::test]
async fn test_end_to_end_through_the_router() {
    let provider = Arc::new(FakeProvider::succeeding(common::sample_exercise()));
    let base_url = common::spawn_server(common::create_test_app_with(provider.clone())).await;

    let exercise = request(&base_url).await.unwrap();
    assert_eq!(exercise, common::sample_exercise());
    assert_eq!(provider.request_count(), 1);

    let failing = common::spawn_server(common::create_test_app_with(Arc::new(
        FakeProvider::failing("upstream down"),
    )))
    .await;
    let err = request(&failing).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Erreur de l'IA : An error occurred while communicating with the AI service."
    );
}
