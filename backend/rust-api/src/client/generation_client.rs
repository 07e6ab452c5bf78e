use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::models::{Difficulty, ErrorBody, ExerciseDefinition, GenerateRequest};

/// The single error type every generation failure is normalized into.
/// `Display` is the French text shown to the student.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Erreur de l'IA : {0}")]
    Upstream(String),
    #[error("Le serveur a rencontré une erreur. Veuillez réessayer plus tard.")]
    Server,
    #[error("L'IA a renvoyé des données invalides. Veuillez réessayer.")]
    InvalidResponse,
    #[error("La connexion au serveur a échoué. Veuillez vérifier votre connexion et réessayer.")]
    Connection,
}

/// Asks the backend for a freshly generated exercise.
#[async_trait]
pub trait ExerciseGenerator: Send + Sync {
    async fn request_exercise(
        &self,
        topic_hint: &str,
        level: &str,
        difficulty: Difficulty,
    ) -> Result<ExerciseDefinition, GenerationError>;
}

/// Rejects bodies that parse but carry no usable exercise.
pub fn validate_shape(body: &Value) -> Result<(), GenerationError> {
    let has_title = body
        .get("title")
        .and_then(Value::as_str)
        .is_some_and(|title| !title.trim().is_empty());
    let has_questions = body
        .get("questions")
        .and_then(Value::as_array)
        .is_some_and(|questions| !questions.is_empty());

    if has_title && has_questions {
        Ok(())
    } else {
        Err(GenerationError::InvalidResponse)
    }
}

/// `POST {base}/api/generate` over reqwest.
pub struct GenerationClient {
    client: Client,
    endpoint: Url,
}

impl GenerationClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let endpoint = Url::parse(base_url)?.join("/api/generate")?;
        Ok(Self::with_client(Client::new(), endpoint))
    }

    pub fn with_client(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn error_from_status(response: reqwest::Response) -> GenerationError {
        let status = response.status();
        match response.json::<ErrorBody>().await {
            Ok(body) if !body.error.trim().is_empty() => {
                tracing::warn!("Generation rejected with {}: {}", status, body.error);
                GenerationError::Upstream(body.error)
            }
            _ => {
                tracing::warn!("Generation failed with {} and no error body", status);
                GenerationError::Server
            }
        }
    }
}

#[async_trait]
impl ExerciseGenerator for GenerationClient {
    async fn request_exercise(
        &self,
        topic_hint: &str,
        level: &str,
        difficulty: Difficulty,
    ) -> Result<ExerciseDefinition, GenerationError> {
        let body = GenerateRequest {
            topic: topic_hint.to_string(),
            level: level.to_string(),
            difficulty: difficulty.to_string(),
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Error reaching {}: {}", self.endpoint, e);
                GenerationError::Connection
            })?;

        if !response.status().is_success() {
            return Err(Self::error_from_status(response).await);
        }

        let value: Value = response.json().await.map_err(|e| {
            tracing::error!("Generation response is not JSON: {}", e);
            GenerationError::InvalidResponse
        })?;

        validate_shape(&value)?;

        serde_json::from_value(value).map_err(|e| {
            tracing::error!("Generation response does not match the exercise shape: {}", e);
            GenerationError::InvalidResponse
        })
    }
}
