//! JSON extractor and response wrapper
//!
//! Body rejections come back in the same envelope as every other API error,
//! so clients only need one error parser.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::{de::DeserializeOwned, Serialize};

use super::error::{ApiError, ApiErrorType};

#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        AxumJson::<T>::from_request(req, state)
            .await
            .map(|AxumJson(value)| Json(value))
            .map_err(rejection_to_api_error)
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

/// Malformed or mistyped bodies are caller errors (400); a wrong content
/// type keeps axum's 415
fn rejection_to_api_error(rejection: JsonRejection) -> ApiError {
    let (status, message) = match &rejection {
        JsonRejection::JsonDataError(err) => (
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", err.body_text()),
        ),
        JsonRejection::JsonSyntaxError(err) => (
            StatusCode::BAD_REQUEST,
            format!("Invalid JSON syntax: {}", err.body_text()),
        ),
        JsonRejection::MissingJsonContentType(_) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected 'Content-Type: application/json'".to_string(),
        ),
        JsonRejection::BytesRejection(err) => (
            rejection.status(),
            format!("Failed to read request body: {}", err.body_text()),
        ),
        _ => (rejection.status(), "Invalid JSON request".to_string()),
    };

    ApiError::new(status, ApiErrorType::InvalidRequestError, message).with_code("invalid_json")
}
