use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::models::{ExerciseDefinition, GenerateRequest};

/// Source of AI generated exercises used by `POST /api/generate`.
#[async_trait]
pub trait ExerciseProvider: Send + Sync {
    async fn generate(&self, req: &GenerateRequest) -> Result<ExerciseDefinition>;
}

pub fn build_prompt(topic: &str, difficulty: &str) -> String {
    format!(
        "Crée un exercice d'espagnol de difficulté \"{}\" sur {}. L'exercice doit contenir 4 questions, \
         mélangeant des questions à choix multiples ('mcq') et des questions à compléter ('fill-in-the-blank'). \
         Pour chaque question, fournis une brève explication en français de la règle de grammaire appliquée.",
        difficulty, topic
    )
}

pub fn system_instruction(level: &str) -> String {
    format!(
        "Tu es un professeur d'espagnol créant du contenu pour des élèves tunisiens du niveau {}. \
         Les instructions, les titres et les explications doivent être en français, mais les questions \
         et les réponses doivent être en espagnol. Assure-toi que la difficulté est appropriée pour le niveau.",
        level
    )
}

/// Structured-output schema mirroring `ExerciseDefinition` on the wire.
pub fn exercise_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {
                "type": "STRING",
                "description": "Un titre bref et descriptif pour l'exercice en français."
            },
            "questions": {
                "type": "ARRAY",
                "description": "Une liste de questions pour l'exercice.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": {
                            "type": "STRING",
                            "description": "Un identifiant unique pour la question, par ex. 'q1'."
                        },
                        "type": {
                            "type": "STRING",
                            "description": "Le type de question, soit 'mcq' (choix multiple) ou 'fill-in-the-blank' (à compléter)."
                        },
                        "question": {
                            "type": "STRING",
                            "description": "Le texte de la question en espagnol. Pour les questions à compléter, utiliser des parenthèses pour le verbe à conjuguer, ex: 'Yo (cantar) __________.'."
                        },
                        "options": {
                            "type": "ARRAY",
                            "description": "Une liste de 4 chaînes de caractères pour les options de réponse. Obligatoire pour le type 'mcq'.",
                            "items": { "type": "STRING" }
                        },
                        "answer": {
                            "type": "STRING",
                            "description": "La réponse correcte. Pour les 'mcq', c'est l'une des options. Pour 'fill-in-the-blank', c'est le mot manquant."
                        },
                        "explanation": {
                            "type": "STRING",
                            "description": "Une brève explication en français de pourquoi la réponse est correcte, en se concentrant sur la règle de grammaire."
                        }
                    },
                    "required": ["id", "type", "question", "answer"]
                }
            }
        },
        "required": ["title", "questions"]
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl Content {
    fn text(role: Option<&str>, text: String) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part { text: Some(text) }],
        }
    }
}

/// Calls the Gemini `generateContent` REST endpoint with a JSON response schema.
pub struct GeminiService {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiService {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build Gemini HTTP client")?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Joins the text parts of the first candidate.
    fn extract_text(response: GenerateContentResponse) -> Result<String> {
        let candidate = response
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Gemini response contained no candidates"))?;

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            anyhow::bail!("Gemini response contained no text");
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl ExerciseProvider for GeminiService {
    async fn generate(&self, req: &GenerateRequest) -> Result<ExerciseDefinition> {
        tracing::info!(
            "Requesting exercise from Gemini: model={}, level={}, difficulty={}",
            self.model,
            req.level,
            req.difficulty
        );

        let body = GenerateContentRequest {
            system_instruction: Content::text(None, system_instruction(&req.level)),
            contents: vec![Content::text(
                Some("user"),
                build_prompt(&req.topic, &req.difficulty),
            )],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: exercise_schema(),
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to call Gemini API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("Gemini returned error {}: {}", status, error_text));
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response envelope")?;

        let text = Self::extract_text(payload)?;

        let exercise: ExerciseDefinition =
            serde_json::from_str(&text).context("Gemini returned text that is not an exercise")?;

        tracing::debug!(
            "Gemini produced '{}' with {} questions",
            exercise.title,
            exercise.questions.len()
        );

        Ok(exercise)
    }
}
