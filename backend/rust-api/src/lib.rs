use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;

pub use config::Config;
pub use services::AppState;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let cors = cors_layer(&app_state.config.server.cors_origins);

    Router::new()
        .route("/health", get(handlers::health_check))
        // Metrics endpoint with Basic Auth protection
        .route(
            "/metrics",
            get(handlers::metrics_handler).layer(middleware::from_fn_with_state(
                app_state.clone(),
                handlers::metrics_auth_middleware,
            )),
        )
        .nest(
            "/api",
            api_routes().layer(middleware::from_fn_with_state(
                app_state.clone(),
                middlewares::auth::session_middleware,
            )),
        )
        .with_state(app_state)
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(middleware::from_fn(
            middlewares::trace::trace_context_middleware,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Any origin without cookies when no origins are configured; otherwise the
/// listed origins, with credentials so the session cookie is sent.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(middlewares::trace::TRACE_ID_HEADER),
        ]);

    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Identification only: no credentials are checked
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/user", get(handlers::auth::current_user))
        .route(
            "/user/{id}/progress",
            get(handlers::progress::get_user_progress),
        )
        // Curriculum
        .route("/stages", get(handlers::stages::list_stages))
        .route("/stages/{id}", get(handlers::stages::get_stage))
        .route(
            "/stages/{id}/lessons",
            get(handlers::lessons::list_stage_lessons),
        )
        .route(
            "/stages/{id}/problems",
            get(handlers::problems::list_stage_problems),
        )
        .route(
            "/stages/{id}/projects",
            get(handlers::projects::list_stage_projects),
        )
        .route(
            "/stages/{id}/resources",
            get(handlers::stages::list_stage_resources),
        )
        .route("/lessons/{id}", get(handlers::lessons::get_lesson))
        .route(
            "/lessons/{id}/complete",
            patch(handlers::lessons::complete_lesson),
        )
        .route("/problems/{id}", get(handlers::problems::get_problem))
        .route(
            "/problems/{id}/complete",
            patch(handlers::problems::complete_problem),
        )
        .route("/projects/{id}", get(handlers::projects::get_project))
        .route(
            "/projects/{id}/complete",
            patch(handlers::projects::complete_project),
        )
}
