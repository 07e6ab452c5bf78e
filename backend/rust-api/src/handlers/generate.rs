use axum::{extract::State, http::StatusCode, Extension, Json};
use std::sync::Arc;
use validator::Validate;

use super::{api_error, ApiError};
use crate::{
    extractors::AppJson,
    metrics::{record_generation, track_upstream_call},
    middlewares::trace::RequestTraceContext,
    models::{generation::MISSING_PARAMETERS, ExerciseDefinition, GenerateRequest},
    services::AppState,
};

pub const UPSTREAM_FAILURE: &str = "An error occurred while communicating with the AI service.";

/// POST /api/generate - Proxy an exercise generation request to the AI provider
pub async fn generate_exercise(
    State(state): State<Arc<AppState>>,
    Extension(trace): Extension<RequestTraceContext>,
    AppJson(req): AppJson<GenerateRequest>,
) -> Result<Json<ExerciseDefinition>, ApiError> {
    if req.validate().is_err() {
        tracing::warn!("Rejected generation request with missing parameters");
        record_generation("rejected");
        return Err(api_error(StatusCode::BAD_REQUEST, MISSING_PARAMETERS));
    }

    tracing::info!(
        "Generating exercise: level={}, difficulty={}",
        req.level,
        req.difficulty
    );

    match track_upstream_call(state.provider.generate(&req)).await {
        Ok(exercise) => {
            record_generation("success");
            tracing::info!(
                "Exercise generated: title='{}', questions={}",
                exercise.title,
                exercise.questions.len()
            );
            Ok(Json(exercise))
        }
        Err(e) => {
            record_generation("error");
            tracing::error!(
                trace_id = %trace.trace_id,
                "Error calling AI provider: {:#}",
                e
            );
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, UPSTREAM_FAILURE))
        }
    }
}
