//! HTTP route definitions

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::app::AppState;
use crate::game::registry::WorldSnapshot;
use crate::game::world::WorldError;
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.client_origin);

    Router::new()
        .route("/health", get(health_handler))
        .route("/world", get(world_handler))
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS from CLIENT_ORIGIN: `*` for any origin, otherwise a comma-separated list
fn cors_layer(client_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if client_origin.trim() == "*" {
        return cors.allow_origin(Any);
    }

    let allowed_origins: Vec<HeaderValue> = client_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();

    cors.allow_origin(allowed_origins)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    players: usize,
    static_objects: usize,
    dynamic_objects: usize,
    ticks: u64,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.world.stats();

    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        players: stats.players(),
        static_objects: stats.static_objects(),
        dynamic_objects: stats.dynamic_objects(),
        ticks: stats.ticks(),
    })
}

// ============================================================================
// World inspection
// ============================================================================

async fn world_handler(State(state): State<AppState>) -> Result<Json<WorldSnapshot>, AppError> {
    let snapshot = state.world.snapshot().await?;
    Ok(Json(snapshot))
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<WorldError> for AppError {
    fn from(err: WorldError) -> Self {
        match err {
            WorldError::Closed => AppError::Unavailable(err.to_string()),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::config::Config;

    fn test_state() -> AppState {
        let config = tokio_test::assert_ok!(Config::from_lookup(|_| None));
        AppState::new(config)
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_reports_empty_world() {
        let router = build_router(test_state());

        let (status, body) = get_json(router, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["players"], 0);
        assert_eq!(body["static_objects"], 0);
        assert_eq!(body["dynamic_objects"], 0);
    }

    #[tokio::test]
    async fn test_world_returns_snapshot() {
        let router = build_router(test_state());

        let (status, body) = get_json(router, "/world").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["players"].as_object().unwrap().is_empty());
        assert!(body["staticObjects"].as_object().unwrap().is_empty());
        assert!(body["dynamicObjects"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_closed_world_maps_to_503() {
        let response = AppError::from(WorldError::Closed).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_cors_accepts_origin_list() {
        // Must not panic on either form
        let _ = cors_layer("*");
        let _ = cors_layer("http://localhost:5173, https://game.example");
    }
}
