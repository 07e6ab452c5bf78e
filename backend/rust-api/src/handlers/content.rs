use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{api_error, ApiError};
use crate::{
    models::{CourseListing, ExamYear, Level, Topic, TopicFilter},
    services::AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct TopicQuery {
    #[serde(default)]
    pub filter: TopicFilter,
    #[serde(default)]
    pub q: String,
}

fn parse_level(raw: &str) -> Result<Level, ApiError> {
    raw.parse::<Level>().map_err(|e| {
        tracing::warn!("{}", e);
        api_error(StatusCode::NOT_FOUND, e)
    })
}

/// GET /api/courses/{level} - Topic list of a level, filtered and searched
pub async fn list_topics(
    State(state): State<Arc<AppState>>,
    Path(level): Path<String>,
    Query(query): Query<TopicQuery>,
) -> Result<Json<CourseListing>, ApiError> {
    let level = parse_level(&level)?;
    tracing::info!(
        "Listing topics: level={}, filter={:?}, q='{}'",
        level,
        query.filter,
        query.q
    );

    let topics = state
        .catalog
        .filtered_topics(level, query.filter, &query.q)
        .into_iter()
        .map(Topic::summary)
        .collect();

    Ok(Json(CourseListing {
        level,
        label: level.label().to_string(),
        topics,
        has_exam_archive: state.catalog.has_exam_archive(level),
    }))
}

/// GET /api/courses/{level}/topics/{id} - Full content of one topic
pub async fn get_topic(
    State(state): State<Arc<AppState>>,
    Path((level, topic_id)): Path<(String, String)>,
) -> Result<Json<Topic>, ApiError> {
    let level = parse_level(&level)?;

    match state.catalog.find_topic(level, &topic_id) {
        Some(topic) => Ok(Json(topic.clone())),
        None => {
            tracing::warn!("Topic not found: level={}, id={}", level, topic_id);
            Err(api_error(
                StatusCode::NOT_FOUND,
                format!("Topic not found: {}", topic_id),
            ))
        }
    }
}

/// GET /api/exams - Bac exam archive
pub async fn list_exams(State(state): State<Arc<AppState>>) -> Json<Vec<ExamYear>> {
    Json(state.catalog.exams().to_vec())
}
