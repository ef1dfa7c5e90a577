// Common DTOs and the error type shared by all HTTP handlers
//
// Every domain error is translated here; nothing reaches a generic framework
// error page.

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use devhelm_core::ControlError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Timestamp format used by app-facing responses
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Standard error response for API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message describing what went wrong.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Body returned for unexpected failures. Details are logged, never echoed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InternalErrorResponse {
    pub error: String,
    pub status_code: u16,
}

/// Per-field validation failures
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorResponse {
    /// Field name to message
    pub errors: BTreeMap<String, String>,
}

/// Response wrapper for list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    /// Array of items returned by the list operation.
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self { data }
    }
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(data: Vec<T>) -> Self {
        Self { data }
    }
}

/// Error type for HTTP handlers
#[derive(Debug)]
pub enum ApiError {
    /// 400 with `{"errors": {field: message}}`
    Validation(BTreeMap<String, String>),
    /// 403 with `{"error": message}`
    Forbidden(String),
    /// 404 with `{"error": message}`
    NotFound(String),
    /// 500 with a generic body
    Internal(anyhow::Error),
}

impl ApiError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), message.into());
        ApiError::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorResponse { errors }),
            )
                .into_response(),
            ApiError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, Json(ErrorResponse::new(message))).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse::new(message))).into_response()
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                internal_error_response()
            }
        }
    }
}

/// The fixed 500 response
pub fn internal_error_response() -> Response {
    let status = StatusCode::INTERNAL_SERVER_ERROR;
    (
        status,
        Json(InternalErrorResponse {
            error: "Internal server error".to_string(),
            status_code: status.as_u16(),
        }),
    )
        .into_response()
}

impl From<ControlError> for ApiError {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::NoTeam => ApiError::Forbidden(err.to_string()),
            ControlError::AgentNotFound(_) => ApiError::NotFound("Agent not found".to_string()),
            ControlError::ApiKeyNotFound(_) => ApiError::NotFound("API key not found".to_string()),
            ControlError::TaskNotFound(_) => ApiError::NotFound("Task not found".to_string()),
            ControlError::EmailTaken => ApiError::field("email", err.to_string()),
            ControlError::InvalidAgentStatus(_) => {
                ApiError::field("status", "Status must be one of: enabled, disabled, unresponsive")
            }
            ControlError::InvalidApiKeyStatus(_) => {
                ApiError::field("status", "Status must be one of: active, revoked")
            }
            ControlError::Storage(e) => ApiError::Internal(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        ApiError::field("body", rejection.body_text())
    }
}
