//! Health check endpoint handlers.
//!
//! Provides health, liveness and readiness endpoints for monitoring and
//! load balancers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};
use usersearch_persistence::core::SearchEngine;

use crate::state::AppState;

/// Handler for the health check endpoint.
///
/// Reports the engine in use without contacting it.
///
/// # HTTP Request
///
/// `GET [base]/health`
///
/// # Response
///
/// - `200 OK` - Server is up
pub async fn health_handler<E>(State(state): State<AppState<E>>) -> Response
where
    E: SearchEngine,
{
    debug!("Processing health check request");

    let health_response = serde_json::json!({
        "status": "healthy",
        "engine": state.engine().engine_name(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    (StatusCode::OK, Json(health_response)).into_response()
}

/// Handler for the liveness probe.
///
/// # HTTP Request
///
/// `GET [base]/_liveness`
pub async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Handler for the readiness probe.
///
/// Asks the engine for its health and answers 503 when it cannot serve.
///
/// # HTTP Request
///
/// `GET [base]/_readiness`
pub async fn readiness_handler<E>(State(state): State<AppState<E>>) -> Response
where
    E: SearchEngine,
{
    debug!("Processing readiness check request");

    let engine_name = state.engine().engine_name();

    match state.engine().health_check().await {
        Ok(()) => {
            let response = serde_json::json!({
                "status": "ready",
                "engine": engine_name,
                "checks": {
                    "engine": "ok"
                }
            });
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            warn!(engine = engine_name, error = %e, "Readiness check failed");
            let response = serde_json::json!({
                "status": "not ready",
                "engine": engine_name,
                "checks": {
                    "engine": e.to_string()
                }
            });
            (StatusCode::SERVICE_UNAVAILABLE, Json(response)).into_response()
        }
    }
}
