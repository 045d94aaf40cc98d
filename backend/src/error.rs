//! Application error handling
//!
//! This module provides unified error handling for the API,
//! converting internal errors to appropriate HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mile_planner_shared::types::{ErrorDetail, ErrorResponse};
use mile_planner_shared::{ScheduleError, ValidationError};
use thiserror::Error;
use tracing::error;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation error: {0}")]
    InvalidField(#[from] ValidationError),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A write did not reach the store; the caller may retry
    #[error("{0}")]
    PersistFailed(String),
}

impl From<ScheduleError> for ApiError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::WeekOutOfRange(_) | ScheduleError::InstanceOutOfRange { .. } => {
                ApiError::NotFound(err.to_string())
            }
            ScheduleError::UnknownWorkout(_) => ApiError::BadRequest(err.to_string()),
            ScheduleError::AlreadyCompleted | ScheduleError::InstanceMissing(_) => {
                ApiError::Conflict(err.to_string())
            }
            ScheduleError::WrongWeekCount { .. }
            | ScheduleError::InvalidWeekNumber(_)
            | ScheduleError::DuplicateInstance(_) => {
                ApiError::Internal(anyhow::Error::new(err).context("Stored schedule is malformed"))
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut field = None;
        let (status, code, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            ApiError::InvalidField(err) => {
                field = Some(err.field.to_string());
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::PersistFailed(msg) => (StatusCode::SERVICE_UNAVAILABLE, "PERSIST_FAILED", msg.clone()),
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Database(err) => {
                error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        });

        (status, body).into_response()
    }
}

impl ApiError {
    /// Classify a failed write
    ///
    /// A rejected CHECK constraint is bad input; anything else did not reach
    /// the store and may be retried.
    pub fn from_write(err: &anyhow::Error, retry_message: &str) -> Self {
        match err.downcast_ref::<sqlx::Error>() {
            Some(sqlx::Error::Database(db)) if db.code().as_deref() == Some(CHECK_VIOLATION) => {
                ApiError::Validation(format!("Rejected by the store: {}", db.message()))
            }
            _ => ApiError::PersistFailed(retry_message.to_string()),
        }
    }
}

/// SQLSTATE for a failed CHECK constraint
const CHECK_VIOLATION: &str = "23514";
