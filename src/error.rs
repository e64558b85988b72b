//! Error types for the scoring engine.
//!
//! `ProviderError` never reaches the caller of the single-source entrypoint;
//! it is absorbed by the orchestrator's fallback or rendered inline by the
//! comparator. `ApiError` only covers HTTP request validation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::providers::Source;

// ---

/// Failure while fetching or normalizing one provider's daily series.
#[derive(Debug, Error)]
pub enum ProviderError {
    // ---
    /// Provider answered with a non-2xx status.
    #[error("{provider} fetch failed: {status}")]
    Status { provider: Source, status: u16 },

    /// Connection, TLS or body transfer failure.
    #[error("{provider} request failed: {message}")]
    Network { provider: Source, message: String },

    /// No response within the configured per-provider timeout.
    #[error("{provider} request timed out")]
    Timeout { provider: Source },

    /// Payload did not have the expected shape.
    #[error("{provider} returned a malformed payload: {message}")]
    Malformed { provider: Source, message: String },

    /// Provider returned zero usable days.
    #[error("No daily data available from {provider}")]
    EmptySeries { provider: Source },

    /// The engine was built without an adapter for this provider.
    #[error("{provider} is not configured")]
    Unavailable { provider: Source },
}

impl ProviderError {
    // ---
    /// Classify a transport error from `reqwest`.
    pub fn from_reqwest(provider: Source, err: reqwest::Error) -> Self {
        // ---
        if err.is_timeout() {
            ProviderError::Timeout { provider }
        } else if err.is_decode() {
            ProviderError::Malformed {
                provider,
                message: err.to_string(),
            }
        } else {
            ProviderError::Network {
                provider,
                message: err.to_string(),
            }
        }
    }
}

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub enum ApiError {
    // ---
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        tracing::warn!("Rejecting request: {}", self);

        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
