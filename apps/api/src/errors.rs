use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::extract::ExtractionError;
use crate::analysis::normalize::NormalizeError;
use crate::llm_client::LlmError;

const UNEXPECTED_ERROR_MESSAGE: &str =
    "An unexpected error occurred while processing your file. Please try again.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant is terminal for the request and renders as `{success: false, error}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    QuotaExceeded(String),

    #[error("{0}")]
    BadUpload(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Model(#[from] LlmError),

    #[error(transparent)]
    Normalization(#[from] NormalizeError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::QuotaExceeded(_) => StatusCode::FORBIDDEN,
            AppError::BadUpload(_) => StatusCode::BAD_REQUEST,
            AppError::Extraction(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            AppError::Extraction(_)
            | AppError::Model(_)
            | AppError::Normalization(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Extraction(e) if !e.is_client_error() => {
                tracing::error!("Extraction error: {e}");
                e.to_string()
            }
            AppError::Model(e) => {
                tracing::error!("LLM error: {e}");
                e.to_string()
            }
            AppError::Normalization(e) => {
                if let NormalizeError::Parse { fragment, .. } = e {
                    tracing::error!("Malformed model output: {e}; fragment: {fragment}");
                } else {
                    tracing::error!("Model output failed schema validation: {e}");
                }
                e.to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                UNEXPECTED_ERROR_MESSAGE.to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}
