//! HTTP error responses
//!
//! Every failure is rendered as `{"error": "<message>"}` with a status code
//! that tells the caller whose fault it was.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, empty or unusable upload batch
    #[error("{0}")]
    Validation(String),

    /// Anything that went wrong while merging or numbering
    #[error("{0}")]
    Processing(String),

    /// Requested output does not exist
    #[error("{0}")]
    NotFound(String),

    /// Request body over the configured limit
    #[error("{0}")]
    PayloadTooLarge(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Processing(msg) => tracing::error!("Processing failed: {}", msg),
            other => tracing::debug!("Request rejected ({}): {}", status, other),
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<crate::Error> for ApiError {
    fn from(err: crate::Error) -> Self {
        ApiError::Processing(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Processing(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Processing(format!("Merge task failed: {}", err))
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(err.body_text())
        } else {
            ApiError::Validation(err.body_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Processing("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::PayloadTooLarge("x".into()).status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_library_errors_surface_raw_message() {
        let err: ApiError = crate::Error::NoInputs.into();
        assert!(matches!(err, ApiError::Processing(ref msg) if msg == "No input files provided"));
    }
}
