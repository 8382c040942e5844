//! The composed HTTP-facing error type. Every collaborator error this
//! binary produces is translated into one of these before it reaches an
//! axum handler's return type, so handlers stay thin.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde_json::json;

use crate::collab::llm::LlmError;
use crate::collab::store::StoreError;
use sidecar_degradation::DegradationError;

#[derive(Debug, thiserror::Error)]
pub enum SidecarError {
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("service unavailable")]
    Unavailable,
    #[error("invalid request: {0}")]
    InputInvalid(String),
}

impl From<DegradationError<LlmError>> for SidecarError {
    fn from(err: DegradationError<LlmError>) -> Self {
        match err {
            DegradationError::PassThrough(LlmError::InputInvalid(reason)) => SidecarError::InputInvalid(reason),
            DegradationError::PassThrough(_) => SidecarError::Unavailable,
            DegradationError::FallbackMiss => SidecarError::Unavailable,
        }
    }
}

impl IntoResponse for SidecarError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            SidecarError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            SidecarError::Store(StoreError::NotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
            SidecarError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            SidecarError::Unavailable => (StatusCode::SERVICE_UNAVAILABLE, "unavailable"),
            SidecarError::InputInvalid(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
        };

        let body = Json(json!({
            "error": error,
            "message": self.to_string(),
            "timestamp": Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}
