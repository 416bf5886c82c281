use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

use crate::{
    error::ApiError,
    extractors::AppPath,
    metrics,
    middlewares::auth::AuthSession,
    models::{EntityId, ProgressTarget, UserProgress},
    services::AppState,
};

/// GET /api/user/{id}/progress - Progress records of a user, oldest first
pub async fn get_user_progress(
    State(state): State<Arc<AppState>>,
    AppPath(user_id): AppPath<EntityId>,
) -> Result<Json<Vec<UserProgress>>, ApiError> {
    tracing::debug!("Getting progress for user_id: {}", user_id);
    Ok(Json(state.storage.get_user_progress(user_id)))
}

/// Bookkeeping after a completion flag changed: counts it, and for a
/// logged-in user keeps their progress row for the item in step with the flag.
pub(crate) fn record_completion(
    state: &AppState,
    session: Option<&AuthSession>,
    stage_id: EntityId,
    target: ProgressTarget,
    is_completed: bool,
) {
    metrics::record_completion(target.kind(), is_completed);

    let Some(session) = session else {
        return;
    };

    if let Some(progress) = state.storage.set_user_progress(
        session.user_id,
        stage_id,
        target,
        is_completed,
        Utc::now(),
    ) {
        tracing::info!(
            "Progress {} for user {}: {} completed = {}",
            progress.id,
            session.user_id,
            target.kind(),
            is_completed
        );
    }
}
