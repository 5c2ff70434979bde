use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
///
/// `NoResumesFound`, `JobParse` and `UnknownEngine` abort a ranking batch before
/// any report exists. Per-resume failures never become an `AppError`; they are
/// captured in `ranking::ItemError` instead.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No resumes found for: {0}")]
    NoResumesFound(String),

    #[error("Job description could not be parsed: {0}")]
    JobParse(String),

    #[error("Unknown engine '{0}' (expected 'heuristic' or 'resume_matcher')")]
    UnknownEngine(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NoResumesFound(_) => "NO_RESUMES_FOUND",
            AppError::JobParse(_) => "JOB_PARSE_ERROR",
            AppError::UnknownEngine(_) => "UNKNOWN_ENGINE",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NoResumesFound(_) | AppError::UnknownEngine(_) | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::JobParse(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match &self {
            AppError::Internal(_) => "An internal server error occurred".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
