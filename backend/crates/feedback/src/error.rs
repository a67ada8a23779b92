//! Feedback Error Types
//!
//! This module provides feedback-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use crate::infra::StorageError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::llm::GatewayError;
use thiserror::Error;

/// Feedback-specific result type alias
pub type FeedbackResult<T> = Result<T, FeedbackError>;

/// Feedback-specific error variants
///
/// Storage and gateway failures keep their source for logging; the response
/// body only ever carries a generic message.
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// Caller input rejected
    #[error("{0}")]
    Validation(String),

    /// Feedback record absent or expired
    #[error("Feedback not found")]
    NotFound,

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },

    /// Object store failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// LLM gateway failure
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl FeedbackError {
    pub fn validation(message: impl Into<String>) -> Self {
        FeedbackError::Validation(message.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            FeedbackError::Validation(_) => StatusCode::BAD_REQUEST,
            FeedbackError::NotFound => StatusCode::NOT_FOUND,
            FeedbackError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            FeedbackError::Gateway(_) => StatusCode::BAD_GATEWAY,
            FeedbackError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FeedbackError::Validation(_) => ErrorKind::BadRequest,
            FeedbackError::NotFound => ErrorKind::NotFound,
            FeedbackError::RateLimited { .. } => ErrorKind::TooManyRequests,
            FeedbackError::Gateway(_) => ErrorKind::BadGateway,
            FeedbackError::Storage(_) => ErrorKind::InternalServerError,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            FeedbackError::Storage(e) => {
                tracing::error!(error = %e, "Feedback storage error");
            }
            FeedbackError::Gateway(e) => {
                tracing::error!(error = %e, "LLM gateway error");
            }
            FeedbackError::RateLimited { retry_after_secs } => {
                tracing::warn!(retry_after_secs, "Feedback rate limit exceeded");
            }
            _ => {
                tracing::debug!(error = %self, "Feedback error");
            }
        }
    }

    /// Boundary form: stable message, internal detail dropped
    pub fn to_app_error(&self) -> AppError {
        match self {
            FeedbackError::Validation(msg) => AppError::bad_request(msg.clone()),
            FeedbackError::NotFound => AppError::not_found("Feedback not found")
                .with_action("Check the link, or ask the sender to share it again."),
            FeedbackError::RateLimited { retry_after_secs } => {
                AppError::too_many_requests("Too many requests. Please slow down.")
                    .with_retry_after(*retry_after_secs)
            }
            FeedbackError::Storage(_) => AppError::internal("Failed to access feedback storage")
                .with_action("Please try again later."),
            FeedbackError::Gateway(_) => AppError::bad_gateway("The assistant is unavailable")
                .with_action("Please try again in a moment."),
        }
    }
}

impl From<FeedbackError> for AppError {
    fn from(err: FeedbackError) -> Self {
        let app = err.to_app_error();
        app.with_source(err)
    }
}

impl IntoResponse for FeedbackError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
