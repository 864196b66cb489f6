use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::resumes::repository::RepositoryError;
use crate::upload::UploadError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Server-side failures keep their cause for the log; clients get a generic message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid resume: {0}")]
    InvalidResume(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Database error: {0:#}")]
    Database(anyhow::Error),

    #[error("Storage error: {0:#}")]
    Storage(anyhow::Error),

    #[error("Conversion error: {0:#}")]
    Conversion(anyhow::Error),

    #[error("LLM error: {0:#}")]
    Llm(anyhow::Error),

    #[error("Internal server error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::InvalidMediaType(_) | UploadError::MissingField(_) => {
                AppError::Validation(err.to_string())
            }
            UploadError::StorageWriteFailed(_) => AppError::Storage(err.into()),
            UploadError::PreviewGenerationFailed(_) => AppError::Conversion(err.into()),
            UploadError::RecordCreationFailed(_) => AppError::Database(err.into()),
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::ResumeNotFound(_) => AppError::InvalidResume(err.to_string()),
            AnalysisError::DeadlineExceeded => AppError::Timeout(err.to_string()),
            AnalysisError::Repository(_) | AnalysisError::FeedbackUpdateFailed(_) => {
                AppError::Database(err.into())
            }
            AnalysisError::SourceMissing { .. } | AnalysisError::Storage(_) => {
                AppError::Storage(err.into())
            }
            AnalysisError::Extraction(_) => AppError::Conversion(err.into()),
            AnalysisError::Upstream(_) | AnalysisError::NoFeedbackProduced => {
                AppError::Llm(err.into())
            }
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => AppError::NotFound(format!("Resume {id} not found")),
            RepositoryError::Database(_) => AppError::Database(err.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidResume(msg) => (StatusCode::BAD_REQUEST, "INVALID_RESUME", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Timeout(msg) => {
                tracing::error!("Request timed out: {msg}");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "TIMEOUT",
                    "The request took too long to complete".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Conversion(e) => {
                tracing::error!("Conversion error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONVERSION_ERROR",
                    "The document could not be processed".to_string(),
                )
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
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
