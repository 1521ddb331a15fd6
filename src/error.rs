// src/error.rs
//! Service error type for the mock IAM service.
//!
//! Every fallible operation in the service funnels into [`ServiceError`],
//! which doubles as the HTTP error response via its `IntoResponse` impl.
//! None of these errors are retried internally; the mock has no external
//! dependency to retry against.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the mock IAM service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No usable signing key for the given signer identity.
    #[error("key resolution failed: {0}")]
    KeyResolution(String),

    /// Token signing failed in the JWT library.
    #[error("token signing failed: {0}")]
    Signing(String),

    /// A presented token could not be parsed.
    #[error("failed to decode token: {0}")]
    Decode(String),

    /// A sign-token request referenced an unknown or already consumed
    /// correlation id.
    #[error("no granted token found for correlation id {0}")]
    CorrelationNotFound(String),

    /// A resolve-name or organization id is not in the participant registry.
    #[error("unknown participant: {0}")]
    UnknownParticipant(String),

    /// A request is missing required fields or carries malformed values.
    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::KeyResolution(_) | ServiceError::Signing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::Decode(_)
            | ServiceError::CorrelationNotFound(_)
            | ServiceError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::UnknownParticipant(_) => StatusCode::NOT_FOUND,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ServiceError::KeyResolution("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (ServiceError::Decode("x".into()), StatusCode::BAD_REQUEST),
            (
                ServiceError::CorrelationNotFound("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::UnknownParticipant("x".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                ServiceError::MalformedRequest("x".into()),
                StatusCode::BAD_REQUEST,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
