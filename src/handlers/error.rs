//! API error type; every failure a handler can report maps to a status code
//! and a JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::StoreError;
use crate::models::ValidationError;

#[derive(Debug)]
pub enum ApiError {
    /// Form input failed validation (400)
    Validation(Vec<ValidationError>),

    /// Not signed in, or not allowed to see the page (401)
    Unauthorized { message: String },

    /// Lookup came back empty (404); `redirect` names the safe parent view
    NotFound { message: String, redirect: String },

    /// Duplicate account or a restricted delete (409)
    Conflict { message: String },

    /// Store failure (500, logged)
    Store(StoreError),

    /// A write the caller expected to succeed changed nothing (500, logged)
    Internal { message: String },
}

impl ApiError {
    pub fn not_found(message: impl Into<String>, redirect: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            redirect: redirect.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "validation_error",
                    "messages": errors.iter().map(ToString::to_string).collect::<Vec<_>>()
                }),
            ),
            Self::Unauthorized { message } => (
                StatusCode::UNAUTHORIZED,
                json!({
                    "error": "unauthorized",
                    "message": message,
                    "redirect": "/signin"
                }),
            ),
            Self::NotFound { message, redirect } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": message,
                    "redirect": redirect
                }),
            ),
            Self::Conflict { message } => (
                StatusCode::CONFLICT,
                json!({
                    "error": "conflict",
                    "message": message
                }),
            ),
            Self::Store(e) => {
                // Log the actual error, return generic message
                tracing::error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": message
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(vec![e])
    }
}

impl From<Vec<ValidationError>> for ApiError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Validation(errors)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::AccountExists { .. } => Self::Conflict {
                message: "This email already has an account".to_string(),
            },
            StoreError::ClassHasEntries { class_id, entries } => Self::Conflict {
                message: format!(
                    "Class {} still has {} entries; scratch them first",
                    class_id, entries
                ),
            },
            _ => Self::Store(e),
        }
    }
}
