#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use espagnol_facile_api::{
    config::{Config, GeminiConfig},
    create_router,
    models::{CorrectAnswer, ExerciseDefinition, GenerateRequest, Question, QuestionKind},
    services::{gemini_service::ExerciseProvider, AppState},
};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn test_config() -> Config {
    Config {
        listen_addr: "127.0.0.1:0".to_string(),
        gemini: GeminiConfig::with_api_key("test-key"),
        metrics_auth: "admin:test".to_string(),
    }
}

pub fn sample_exercise() -> ExerciseDefinition {
    ExerciseDefinition {
        title: "Le Futur Simple".to_string(),
        questions: vec![
            Question {
                id: "q1".to_string(),
                kind: QuestionKind::MultipleChoice,
                prompt: "Mañana yo (ir) __________ a la playa.".to_string(),
                options: Some(vec![
                    "iré".to_string(),
                    "iba".to_string(),
                    "fui".to_string(),
                    "voy".to_string(),
                ]),
                correct_answer: CorrectAnswer::from("iré"),
                explanation: Some("Le futur de 'ir' est irrégulier au radical.".to_string()),
            },
            Question {
                id: "q2".to_string(),
                kind: QuestionKind::FillInBlank,
                prompt: "Nosotros (comer) __________ juntos.".to_string(),
                options: None,
                correct_answer: CorrectAnswer::from("comeremos"),
                explanation: None,
            },
        ],
    }
}

/// Provider that answers with a canned result and records every request.
pub struct FakeProvider {
    result: Result<ExerciseDefinition, String>,
    pub requests: Mutex<Vec<GenerateRequest>>,
}

impl FakeProvider {
    pub fn succeeding(exercise: ExerciseDefinition) -> Self {
        Self {
            result: Ok(exercise),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ExerciseProvider for FakeProvider {
    async fn generate(&self, req: &GenerateRequest) -> anyhow::Result<ExerciseDefinition> {
        self.requests.lock().unwrap().push(req.clone());
        self.result.clone().map_err(|message| anyhow::anyhow!(message))
    }
}

pub fn create_test_app_with(provider: Arc<dyn ExerciseProvider>) -> Router {
    init_tracing();
    let state = AppState::with_provider(test_config(), provider)
        .expect("Failed to initialize test app state");
    create_router(Arc::new(state))
}

pub fn create_test_app() -> Router {
    create_test_app_with(Arc::new(FakeProvider::succeeding(sample_exercise())))
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Base URL of a port nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
