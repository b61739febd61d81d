use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Residual error type for the HTTP layer.
///
/// Per the degradation-never-error design: governors, caches and adapters
/// convert failure into a typed fallback or an empty shape before it ever
/// reaches a handler. This enum exists only for malformed request structure
/// and truly unexpected storage/config failures.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::BadRequest(msg) => {
                HttpResponse::BadRequest().json(json!({ "error": msg }))
            }
            AppError::Storage(err) => {
                tracing::error!(error = %err, "storage failure");
                HttpResponse::InternalServerError().json(json!({ "error": "storage failure" }))
            }
            AppError::Configuration(msg) => {
                tracing::error!(error = %msg, "configuration failure");
                HttpResponse::InternalServerError().json(json!({ "error": "configuration failure" }))
            }
        }
    }
}
