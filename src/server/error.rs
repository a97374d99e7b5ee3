//! API error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::audit::AuditError;
use crate::compute::ComputeError;

/// Errors surfaced by the HTTP handlers.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// Client-supplied input violated a precondition. The message is the
    /// entire response body.
    #[error("{0}")]
    BadRequest(String),

    /// A read query against the audit store failed.
    #[error("Audit query failed: {0}")]
    Audit(#[from] AuditError),
}

impl From<ComputeError> for ApiError {
    fn from(error: ComputeError) -> Self {
        Self::BadRequest(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            Self::Audit(error) => {
                tracing::error!(%error, "Audit query failed");
                // No internal detail reaches the client.
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
