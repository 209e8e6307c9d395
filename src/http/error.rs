//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::services::error::ScheduleError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Structured details (conflicting sessions, unavailable supervisors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// Scheduling error (conflict, availability, storage)
    Schedule(ScheduleError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Schedule(err) => return schedule_error_response(err),
        };

        (status, Json(error)).into_response()
    }
}

fn schedule_error_response(err: ScheduleError) -> Response {
    let (status, error) = match err {
        ScheduleError::Validation(msg) => {
            (StatusCode::BAD_REQUEST, ApiError::new("VALIDATION_ERROR", msg))
        }
        ScheduleError::Conflict(report) => {
            let code = if report.classroom.is_some() {
                "CLASSROOM_CONFLICT"
            } else {
                "GROUP_CONFLICT"
            };
            let message = report.to_string();
            let details = serde_json::to_value(&report).unwrap_or_default();
            (
                StatusCode::BAD_REQUEST,
                ApiError::new(code, message).with_details(details),
            )
        }
        ScheduleError::UnavailableSupervisors(verdicts) => {
            let details = serde_json::to_value(&verdicts).unwrap_or_default();
            (
                StatusCode::BAD_REQUEST,
                ApiError::new(
                    "UNAVAILABLE_SUPERVISORS",
                    format!("{} supervisor(s) unavailable", verdicts.len()),
                )
                .with_details(details),
            )
        }
        ScheduleError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            ApiError::new("NOT_FOUND", format!("session {} not found", id)),
        ),
        ScheduleError::CancelledImmutable(id) => (
            StatusCode::BAD_REQUEST,
            ApiError::new(
                "SESSION_CANCELLED",
                format!("session {} is cancelled and cannot be modified", id),
            ),
        ),
        ScheduleError::Repository(e) if e.is_not_found() => {
            (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", e.to_string()))
        }
        ScheduleError::Repository(e) => {
            // Storage failures stay generic on the wire; the details go to
            // the log.
            tracing::error!("repository failure: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("STORAGE_ERROR", "storage backend failure"),
            )
        }
    };

    (status, Json(error)).into_response()
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        AppError::Schedule(err)
    }
}

impl From<crate::db::repository::RepositoryError> for AppError {
    fn from(err: crate::db::repository::RepositoryError) -> Self {
        AppError::Schedule(ScheduleError::Repository(err))
    }
}
