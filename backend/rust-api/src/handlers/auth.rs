use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use std::sync::Arc;
use validator::Validate;

use crate::{
    config::SessionConfig,
    error::ApiError,
    extractors::{AppJson, CurrentSession, OptionalSession},
    metrics::LOGINS_TOTAL,
    models::{first_validation_message, LoginRequest, MessageResponse, User},
    services::AppState,
};

/// POST /api/auth/login - Identify by username, creating the user on first login
pub async fn login(
    State(state): State<Arc<AppState>>,
    OptionalSession(existing): OptionalSession,
    jar: CookieJar,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<User>), ApiError> {
    if let Err(e) = req.validate() {
        LOGINS_TOTAL.with_label_values(&["rejected"]).inc();
        return Err(ApiError::bad_request(first_validation_message(&e)));
    }

    let username = req.username.trim();
    tracing::info!("Login attempt for user: {}", username);

    let (user, created) = state.storage.find_or_create_user(username)?;
    LOGINS_TOTAL
        .with_label_values(&[if created { "created" } else { "existing" }])
        .inc();

    // A new login replaces whatever session the browser held before
    if let Some(previous) = existing {
        state.sessions.destroy(&previous.token)?;
    }

    let token = state.sessions.create(user.id)?;
    let jar = jar.add(session_cookie(&state.config.session, token));

    tracing::info!("User {} logged in (new account: {})", user.id, created);
    Ok((jar, Json(user)))
}

/// POST /api/auth/logout - Destroy the session and expire its cookie
pub async fn logout(
    State(state): State<Arc<AppState>>,
    OptionalSession(session): OptionalSession,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    if let Some(session) = session {
        state.sessions.destroy(&session.token).map_err(|e| {
            tracing::error!("Failed to destroy session: {}", e);
            ApiError::internal("Logout failed")
        })?;
        tracing::info!("User {} logged out", session.user_id);
    }

    let jar = jar.add(expired_cookie(&state.config.session));
    Ok((jar, Json(MessageResponse::new("Logged out successfully"))))
}

/// GET /api/user - The user behind the current session
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Result<Json<User>, ApiError> {
    tracing::debug!("Getting current user for user_id: {}", session.user_id);

    state
        .storage
        .get_user(session.user_id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("User not found"))
}

fn session_cookie(config: &SessionConfig, token: String) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookie)
        .same_site(config.parse_same_site())
        .max_age(time::Duration::seconds(config.ttl_seconds))
        .build()
}

fn expired_cookie(config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), ""))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookie)
        .same_site(config.parse_same_site())
        .max_age(time::Duration::ZERO)
        .build()
}
