//! Structured error types for HTTP responses.

use crate::store::StoreError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    MissingRequiredField,
    InvalidFieldValue,

    // The AI credential is not configured
    ConfigurationMissing,

    // The model call failed
    UpstreamFailure,

    // Internal errors
    PersistenceError,
    InternalError,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::MissingRequiredField | ErrorCode::InvalidFieldValue => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::ConfigurationMissing => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::UpstreamFailure
            | ErrorCode::PersistenceError
            | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Structured error returned by HTTP handlers as `{ "error": ..., "code": ... }`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    #[serde(rename = "error")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }

    // Convenience constructors

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("{} is required", field),
        )
        .with_field(field)
    }

    pub fn invalid_value(field: &str, reason: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, reason).with_field(field)
    }

    pub fn invalid_body(reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidFieldValue,
            format!("invalid request body: {}", reason),
        )
    }

    pub fn configuration_missing(var: &str) -> Self {
        Self::new(
            ErrorCode::ConfigurationMissing,
            format!("{} environment variable is not set.", var),
        )
    }

    /// Upstream model failure. Uses the error's own message when it has one.
    pub fn upstream(err: &anyhow::Error) -> Self {
        let message = err.to_string();
        let message = if message.trim().is_empty() {
            "AI request failed".to_string()
        } else {
            message
        };
        Self::new(ErrorCode::UpstreamFailure, message)
    }

    pub fn persistence(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::PersistenceError, err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmptyTitle => ApiError::invalid_value("title", "title must not be empty"),
            StoreError::IdsExhausted(_) => ApiError::internal(err),
            StoreError::Persistence(e) => ApiError::persistence(format!("{:#}", e)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = ?self.code, "{}", self.message);
        } else {
            tracing::debug!(code = ?self.code, "{}", self.message);
        }
        (status, Json(self)).into_response()
    }
}

/// Result type for HTTP handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::missing_field("title").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::configuration_missing("GEMINI_API_KEY").status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::upstream(&anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_serializes_error_field() {
        let json = serde_json::to_value(ApiError::missing_field("title")).unwrap();
        assert_eq!(json["error"], "title is required");
        assert_eq!(json["code"], "MISSING_REQUIRED_FIELD");
        assert_eq!(json["field"], "title");
    }

    #[test]
    fn test_upstream_uses_error_message() {
        let err = ApiError::upstream(&anyhow::anyhow!("quota exceeded"));
        assert_eq!(err.message, "quota exceeded");

        let err = ApiError::upstream(&anyhow::anyhow!(""));
        assert_eq!(err.message, "AI request failed");
    }

    #[test]
    fn test_from_store_error() {
        let err: ApiError = StoreError::EmptyTitle.into();
        assert_eq!(err.code, ErrorCode::InvalidFieldValue);
        assert_eq!(err.field.as_deref(), Some("title"));

        let err: ApiError = StoreError::Persistence(anyhow::anyhow!("disk full")).into();
        assert_eq!(err.code, ErrorCode::PersistenceError);
        assert!(err.message.contains("disk full"));
    }
}
