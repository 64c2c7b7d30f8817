//! Error handling
//!
//! Pipeline failures are mapped to generic messages; the detail goes to the
//! server log only.

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;
use thiserror::Error;

use risk_review_core::{PersistenceError, PipelineError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// The fitted transform rejected the submission
    #[error("submission rejected by the model: {0}")]
    Rejected(String),

    /// The model could not produce a verdict
    #[error("inference failed: {0}")]
    Inference(String),

    /// The audit row could not be written; the verdict is withheld
    #[error("audit log unavailable: {0}")]
    AuditUnavailable(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Rejected(msg) => {
                tracing::warn!("Submission rejected: {}", msg);
                (StatusCode::UNPROCESSABLE_ENTITY, "Submission could not be encoded for the model")
            }
            AppError::Inference(msg) => {
                tracing::error!("Inference error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Model inference failed")
            }
            AppError::AuditUnavailable(msg) => {
                tracing::error!("Audit log error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Audit log unavailable, verdict withheld")
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Encoding(e) => AppError::Rejected(e.to_string()),
            PipelineError::Inference(e) => AppError::Inference(e.to_string()),
            PipelineError::Persistence(e) => AppError::AuditUnavailable(e.to_string()),
        }
    }
}

impl From<PersistenceError> for AppError {
    fn from(err: PersistenceError) -> Self {
        AppError::AuditUnavailable(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(err.to_string())
    }
}
