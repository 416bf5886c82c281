use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    error::ApiError,
    extractors::{AppJson, AppPath, OptionalSession},
    handlers::progress::record_completion,
    models::{CompletionRequest, EntityId, Lesson, ProgressTarget},
    services::AppState,
};

/// GET /api/stages/{id}/lessons - Lessons of a stage ordered by `order`
pub async fn list_stage_lessons(
    State(state): State<Arc<AppState>>,
    AppPath(stage_id): AppPath<EntityId>,
) -> Result<Json<Vec<Lesson>>, ApiError> {
    let lessons = state.storage.get_lessons_by_stage(stage_id);
    tracing::debug!("Stage {} has {} lessons", stage_id, lessons.len());
    Ok(Json(lessons))
}

/// GET /api/lessons/{id}
pub async fn get_lesson(
    State(state): State<Arc<AppState>>,
    AppPath(lesson_id): AppPath<EntityId>,
) -> Result<Json<Lesson>, ApiError> {
    state
        .storage
        .get_lesson(lesson_id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Lesson not found"))
}

/// PATCH /api/lessons/{id}/complete
pub async fn complete_lesson(
    State(state): State<Arc<AppState>>,
    OptionalSession(session): OptionalSession,
    AppPath(lesson_id): AppPath<EntityId>,
    AppJson(req): AppJson<CompletionRequest>,
) -> Result<Json<Lesson>, ApiError> {
    tracing::info!(
        "Setting lesson {} completion to {}",
        lesson_id,
        req.is_completed
    );

    let lesson = state
        .storage
        .update_lesson_completion(lesson_id, req.is_completed)?;

    record_completion(
        &state,
        session.as_ref(),
        lesson.stage_id,
        ProgressTarget::Lesson(lesson.id),
        req.is_completed,
    );

    Ok(Json(lesson))
}
