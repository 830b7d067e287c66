//! API types shared by the handlers

pub mod error;
pub mod json;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
