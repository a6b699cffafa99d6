pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared handles for request handling. Both collaborators sit behind trait
/// objects so tests can swap in doubles.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn database::ProfileStore>,
    pub auth: Arc<dyn auth::Authenticator>,
}

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Authenticated API
        .merge(profile_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn profile_routes(state: AppState) -> Router<AppState> {
    use handlers::{activities, profiles};

    Router::new()
        .route("/api/profiles", post(profiles::create))
        .route(
            "/api/profiles/:user_id",
            get(profiles::get).put(profiles::update).delete(profiles::delete),
        )
        .route(
            "/api/profiles/:user_id/activities",
            post(activities::add).put(activities::update),
        )
        // Every route in this group requires verified credentials
        .layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::basic_auth_middleware,
        ))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Trail Profile API",
            "version": version,
            "description": "Profile and activity-preference service for the Trail platform",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "profiles": "/api/profiles[/:user_id] (basic auth)",
                "activities": "/api/profiles/:user_id/activities (basic auth)",
            }
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
