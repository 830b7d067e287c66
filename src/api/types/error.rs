//! API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Error categories exposed to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    NotFoundError,
    ConflictError,
    ServerError,
    ServiceUnavailableError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::ConflictError => write!(f, "conflict_error"),
            Self::ServerError => write!(f, "server_error"),
            Self::ServiceUnavailableError => write!(f, "service_unavailable_error"),
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

/// Error detail structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: ApiErrorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Whether repeating the request later may succeed
    pub retryable: bool,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    /// Create a new API error
    pub fn new(
        status: StatusCode,
        error_type: ApiErrorType,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: ApiErrorDetail {
                    message: message.into(),
                    error_type,
                    param: None,
                    code: None,
                    retryable: false,
                },
            },
        }
    }

    /// Add parameter info
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.response.error.param = Some(param.into());
        self
    }

    /// Add error code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.response.error.code = Some(code.into());
        self
    }

    pub fn retryable(mut self) -> Self {
        self.response.error.retryable = true;
        self
    }

    /// Bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorType::InvalidRequestError, message)
    }

    /// Not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, ApiErrorType::ConflictError, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorType::ServerError, message)
    }

    /// Service unavailable
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorType::ServiceUnavailableError,
            message,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let code = match &err {
            DomainError::WriteFailed { stage, .. } => Some(format!("write_failed_{}", stage)),
            _ => None,
        };

        let api_error = match err.root_cause() {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::Conflict { message } => Self::conflict(message),
            DomainError::Provider {
                provider, message, ..
            } => Self::unavailable(format!("{}: {}", provider, message)).retryable(),
            DomainError::IndexConsistency { message } | DomainError::Storage { message } => {
                Self::unavailable(message).retryable()
            }
            DomainError::Configuration { message } => Self::internal(message),
            DomainError::Internal { message } => Self::internal(message).retryable(),
            DomainError::WriteFailed { .. } => Self::internal(err.to_string()),
        };

        match code {
            Some(code) => api_error.with_code(code),
            None => api_error,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error.error_type, self.response.error.message
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WriteStage;

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::bad_request("Prompt is required");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.error_type, ApiErrorType::InvalidRequestError);
        assert_eq!(err.response.error.message, "Prompt is required");
        assert!(!err.response.error.retryable);
    }

    #[test]
    fn test_api_error_with_param() {
        let err = ApiError::bad_request("Invalid value")
            .with_param("threshold")
            .with_code("out_of_range");

        assert_eq!(err.response.error.param, Some("threshold".to_string()));
        assert_eq!(err.response.error.code, Some("out_of_range".to_string()));
    }

    #[test]
    fn test_domain_error_conversion() {
        let api_err: ApiError = DomainError::not_found("Knowledge base '1' not found").into();
        assert_eq!(api_err.status, StatusCode::NOT_FOUND);

        let api_err: ApiError = DomainError::conflict("slug taken").into();
        assert_eq!(api_err.status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_provider_errors_are_retryable() {
        let api_err: ApiError = DomainError::provider("openai", "HTTP 401").into();
        assert_eq!(api_err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(api_err.response.error.retryable);
    }

    #[test]
    fn test_write_failure_maps_by_root_cause() {
        let api_err: ApiError = DomainError::write_failed(
            WriteStage::Chunked,
            DomainError::validation("content must produce at least one chunk"),
        )
        .into();

        assert_eq!(api_err.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            api_err.response.error.code.as_deref(),
            Some("write_failed_chunked")
        );

        let api_err: ApiError = DomainError::write_failed(
            WriteStage::Embedded,
            DomainError::provider_transient("openai", "HTTP 503"),
        )
        .into();
        assert_eq!(api_err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(api_err.response.error.retryable);
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::not_found("Entry not found");
        let json = serde_json::to_string(&err.response).unwrap();

        assert!(json.contains("not_found_error"));
        assert!(json.contains("\"retryable\":false"));
    }
}
