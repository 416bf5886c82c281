use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::models::EntityId;
use crate::services::AppState;

/// Resolved login session, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub user_id: EntityId,
}

/// Resolves the session cookie (if any) into an `AuthSession` extension.
/// Never rejects; handlers decide whether a session is required.
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(cookie) = jar.get(&state.config.session.cookie_name) {
        let token = cookie.value();
        match state.sessions.resolve(token) {
            Ok(Some(user_id)) => {
                tracing::debug!("Authenticated user: {}", user_id);
                request.extensions_mut().insert(AuthSession {
                    token: token.to_string(),
                    user_id,
                });
            }
            Ok(None) => tracing::debug!("Ignoring unknown or expired session cookie"),
            Err(e) => tracing::error!("Session lookup failed: {}", e),
        }
    }

    next.run(request).await
}
