use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose, Engine as _};
use serde_json::json;
use std::sync::Arc;

use crate::metrics;
use crate::models::{ErrorBody, Level};
use crate::services::AppState;

pub mod content;
pub mod generate;

/// Failure response shared by all API handlers.
pub type ApiError = (StatusCode, Json<ErrorBody>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorBody::new(message)))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let catalog = &state.catalog;
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "espagnol-facile-api",
            "version": env!("CARGO_PKG_VERSION"),
            "dependencies": {
                "catalog": {
                    "status": "healthy",
                    "topics": {
                        "3A": catalog.topics(Level::ThirdYear).len(),
                        "BAC": catalog.topics(Level::Baccalaureate).len(),
                    },
                    "exam_years": catalog.exams().len(),
                },
                "ai_provider": {
                    "status": "configured",
                    "model": state.config.gemini.model,
                }
            }
        })),
    )
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render metrics: {}", e),
        ),
    }
}

/// Protects `/metrics` with HTTP Basic auth against `metrics_auth`.
pub async fn metrics_auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let encoded = auth_header
        .strip_prefix("Basic ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let decoded = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    let credentials = String::from_utf8(decoded).map_err(|_| StatusCode::UNAUTHORIZED)?;

    if credentials != state.config.metrics_auth {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(request).await)
}
