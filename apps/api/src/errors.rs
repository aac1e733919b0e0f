use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The session already produced its CV draft and accepts no further input.
    #[error("Session closed: {0}")]
    SessionClosed(String),

    /// The language model failed or returned unusable output. Retrying the
    /// same input is safe: the failed turn left no trace in the history.
    #[error("Generation failed: {0}")]
    Generation(#[from] LlmError),

    /// Session state violates an invariant. Fatal for that session.
    #[error("Invalid conversation state: {0}")]
    InvalidState(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::SessionClosed(msg) => (StatusCode::CONFLICT, "SESSION_CLOSED", msg.clone()),
            AppError::Generation(e) => {
                tracing::error!("Generation error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "GENERATION_ERROR",
                    "The language model could not answer. Please repeat your message.".to_string(),
                )
            }
            AppError::InvalidState(msg) => {
                tracing::error!("Invalid conversation state: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INVALID_STATE",
                    msg.clone(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
