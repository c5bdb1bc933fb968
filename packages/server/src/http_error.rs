//! HTTP error handling
//!
//! Every failed request answers with the same JSON shape:
//! `{"message": ..., "code": ..., "details": ...}`. The status code is
//! derived from `code`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use wbs_core::{ValidationError, WbsServiceError};

/// Error body returned by every endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    /// Optional detailed error information for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HttpError {
    /// Create a new HTTP error
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Create a new HTTP error with details
    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: Some(details.into()),
        }
    }

    pub fn node_not_found() -> Self {
        Self::new("Node not found", "NODE_NOT_FOUND")
    }

    /// Request payload could not be accepted
    pub fn invalid_data(details: impl Into<String>) -> Self {
        Self::with_details("Invalid data", "INVALID_INPUT", details)
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "NODE_NOT_FOUND" => StatusCode::NOT_FOUND,
            "INVALID_INPUT" | "VALIDATION_ERROR" | "INVALID_PARENT" => StatusCode::BAD_REQUEST,
            "CIRCULAR_REFERENCE" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<WbsServiceError> for HttpError {
    fn from(err: WbsServiceError) -> Self {
        match &err {
            WbsServiceError::InvalidParent { parent_id } => {
                HttpError::with_details(err.to_string(), "INVALID_PARENT", format!("parentId: {}", parent_id))
            }
            WbsServiceError::CircularReference { .. } => {
                HttpError::new(err.to_string(), "CIRCULAR_REFERENCE")
            }
        }
    }
}

impl From<ValidationError> for HttpError {
    fn from(err: ValidationError) -> Self {
        HttpError::with_details("Invalid data", "VALIDATION_ERROR", err.to_string())
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        HttpError::invalid_data(rejection.body_text())
    }
}
