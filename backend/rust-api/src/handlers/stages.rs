use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    error::ApiError,
    extractors::AppPath,
    models::{EntityId, LearningStage, Resource},
    services::AppState,
};

/// GET /api/stages - All stages ordered by level
pub async fn list_stages(State(state): State<Arc<AppState>>) -> Json<Vec<LearningStage>> {
    Json(state.storage.get_all_stages())
}

/// GET /api/stages/{id}
pub async fn get_stage(
    State(state): State<Arc<AppState>>,
    AppPath(stage_id): AppPath<EntityId>,
) -> Result<Json<LearningStage>, ApiError> {
    state
        .storage
        .get_stage(stage_id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Stage not found"))
}

/// GET /api/stages/{id}/resources
pub async fn list_stage_resources(
    State(state): State<Arc<AppState>>,
    AppPath(stage_id): AppPath<EntityId>,
) -> Result<Json<Vec<Resource>>, ApiError> {
    Ok(Json(state.storage.get_resources_by_stage(stage_id)))
}
