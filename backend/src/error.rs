//! Error handling for the snack tracking server
//!
//! Every rejected mutation leaves the store untouched; the variant decides the
//! HTTP status and the machine-readable code sent back to the caller.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::ValidationError;
use thiserror::Error;
use uuid::Uuid;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Client errors
    #[error("Invalid input: {message}")]
    InvalidInput {
        field: Option<String>,
        message: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The snack has never been delivered, so there is no week to record against
    #[error("No tracking record for snack {snack_id}")]
    NoDelivery { snack_id: Uuid },

    // Persistence errors
    #[error("Store error: {0}")]
    StoreError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::InvalidInput {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidInput {
            field: Some(err.field),
            message: err.message,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput {
            field: None,
            message: rejection.body_text(),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidInput { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "INVALID_INPUT".to_string(),
                    message: message.clone(),
                    field: field.clone(),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{} not found", resource),
                    field: None,
                },
            ),
            AppError::NoDelivery { .. } => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NO_DELIVERY".to_string(),
                    message: "No initial quantity found for this snack. Please wait for a delivery before recording wastage or shortage.".to_string(),
                    field: Some("snack_id".to_string()),
                },
            ),
            AppError::StoreError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "STORE_ERROR".to_string(),
                    message: "A storage error occurred".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: msg.clone(),
                    field: None,
                },
            ),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let internal = AppError::Internal("boom".to_string()).into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let store = AppError::StoreError(sqlx::Error::RowNotFound).into_response();
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let missing = AppError::NoDelivery { snack_id: Uuid::new_v4() }.into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let invalid = AppError::invalid("quantity", "Quantity is too large").into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }
}
