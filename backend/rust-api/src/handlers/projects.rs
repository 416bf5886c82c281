use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    error::ApiError,
    extractors::{AppJson, AppPath, OptionalSession},
    handlers::progress::record_completion,
    models::{CompletionRequest, EntityId, Project, ProgressTarget},
    services::AppState,
};

/// GET /api/stages/{id}/projects
pub async fn list_stage_projects(
    State(state): State<Arc<AppState>>,
    AppPath(stage_id): AppPath<EntityId>,
) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(state.storage.get_projects_by_stage(stage_id)))
}

pub async fn get_project(
    State(state): State<Arc<AppState>>,
    AppPath(project_id): AppPath<EntityId>,
) -> Result<Json<Project>, ApiError> {
    state
        .storage
        .get_project(project_id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Project not found"))
}

/// PATCH /api/projects/{id}/complete
pub async fn complete_project(
    State(state): State<Arc<AppState>>,
    OptionalSession(session): OptionalSession,
    AppPath(project_id): AppPath<EntityId>,
    AppJson(req): AppJson<CompletionRequest>,
) -> Result<Json<Project>, ApiError> {
    tracing::info!(
        "Setting project {} completion to {}",
        project_id,
        req.is_completed
    );

    let project = state
        .storage
        .update_project_completion(project_id, req.is_completed)?;

    record_completion(
        &state,
        session.as_ref(),
        project.stage_id,
        ProgressTarget::Project(project.id),
        req.is_completed,
    );

    Ok(Json(project))
}
