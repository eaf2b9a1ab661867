//! Error handling for the REST API server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use proctor_core::error::ProctorError;
use serde::Serialize;
use std::fmt;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub suggestion: Option<String>,
    pub retryable: bool,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            suggestion: None,
            retryable: false,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub retryable: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                suggestion: self.suggestion,
                retryable: self.retryable,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<ProctorError> for ApiError {
    fn from(err: ProctorError) -> Self {
        let status = match &err {
            ProctorError::NotFound { .. } => StatusCode::NOT_FOUND,
            ProctorError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ProctorError::State { .. } => StatusCode::CONFLICT,
            ProctorError::TransientIo { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ProctorError::Configuration(_) | ProctorError::UnsupportedProvider { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::warn!(error = %err, "Request failed");
        }

        Self {
            status,
            code: err.code().as_str().to_string(),
            message: err.to_string(),
            suggestion: err.suggestion().map(str::to_string),
            retryable: err.is_retryable(),
        }
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use proctor_core::error::ErrorCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ProctorError::item_not_found("q1"), StatusCode::NOT_FOUND),
            (ProctorError::validation("bad"), StatusCode::UNPROCESSABLE_ENTITY),
            (
                ProctorError::state(ErrorCode::StateSessionCompleted, "done"),
                StatusCode::CONFLICT,
            ),
            (ProctorError::timeout("slow"), StatusCode::SERVICE_UNAVAILABLE),
            (
                ProctorError::Configuration("no key".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ProctorError::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_transient_errors_are_retryable() {
        let err = ApiError::from(ProctorError::generator("overloaded"));
        assert!(err.retryable);
        assert_eq!(err.code, ErrorCode::IoGeneratorFailed.as_str());
        assert!(err.suggestion.is_some());
    }
}
