//! Application error types.
//!
//! Only the errors that escape the probe layer live here. Per-backend probe
//! failures are rendered into the response body instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Result alias used by handlers and services.
pub type AppResult<T> = Result<T, AppError>;

/// Errors surfaced to HTTP clients or to process startup.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request used a method other than POST.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Request body is not a JSON document of the expected shape.
    #[error("Failed to decode request body: {0}")]
    Decode(String),

    /// Listener could not be bound at startup.
    #[error("Failed to start server on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Decode(_) => StatusCode::BAD_REQUEST,
            AppError::Bind { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "request rejected");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_not_allowed_maps_to_405() {
        let err = AppError::MethodNotAllowed;
        assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(err.to_string(), "Method not allowed");
    }

    #[test]
    fn test_json_error_becomes_decode_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AppError::from(json_err);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().starts_with("Failed to decode request body: "));
    }

    #[tokio::test]
    async fn test_into_response_writes_plain_text_body() {
        let response = AppError::Decode("EOF".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Failed to decode request body: EOF");
    }
}
