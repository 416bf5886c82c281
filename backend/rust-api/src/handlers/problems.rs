use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    error::ApiError,
    extractors::{AppJson, AppPath, OptionalSession},
    handlers::progress::record_completion,
    models::{CompletionRequest, EntityId, Problem, ProgressTarget},
    services::AppState,
};

/// GET /api/stages/{id}/problems - Problems of a stage
pub async fn list_stage_problems(
    State(state): State<Arc<AppState>>,
    AppPath(stage_id): AppPath<EntityId>,
) -> Result<Json<Vec<Problem>>, ApiError> {
    Ok(Json(state.storage.get_problems_by_stage(stage_id)))
}

/// GET /api/problems/{id}
pub async fn get_problem(
    State(state): State<Arc<AppState>>,
    AppPath(problem_id): AppPath<EntityId>,
) -> Result<Json<Problem>, ApiError> {
    state
        .storage
        .get_problem(problem_id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Problem not found"))
}

/// PATCH /api/problems/{id}/complete
pub async fn complete_problem(
    State(state): State<Arc<AppState>>,
    OptionalSession(session): OptionalSession,
    AppPath(problem_id): AppPath<EntityId>,
    AppJson(req): AppJson<CompletionRequest>,
) -> Result<Json<Problem>, ApiError> {
    tracing::info!(
        "Setting problem {} completion to {}",
        problem_id,
        req.is_completed
    );

    let problem = state
        .storage
        .update_problem_completion(problem_id, req.is_completed)?;

    record_completion(
        &state,
        session.as_ref(),
        problem.stage_id,
        ProgressTarget::Problem(problem.id),
        req.is_completed,
    );

    Ok(Json(problem))
}
