// src/routes/health.rs
//! Liveness endpoint for the ClimaScore service.
//!
//! Used by container orchestrators and CI to verify the process answers HTTP.
//! It never calls a climate provider, so an upstream outage does not make the
//! service look dead.

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Handle `GET /health`.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Subrouter with the `/health` route, generic over the gateway state.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}
