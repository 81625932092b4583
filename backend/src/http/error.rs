//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// No route matched the request
    NotFound(String),
    Internal(String),
    /// Rejected calendar query
    Calendar(CalendarError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::Calendar(e) => {
                let msg = e.to_string();
                match e {
                    CalendarError::EventNotFound { count, .. } => (
                        StatusCode::NOT_FOUND,
                        ApiError::new("EVENT_NOT_FOUND", msg)
                            .with_details(format!("{} events on this day", count)),
                    ),
                    CalendarError::InvalidMonth { .. } => {
                        (StatusCode::BAD_REQUEST, ApiError::new("INVALID_MONTH", msg))
                    }
                    CalendarError::InvalidDate(_) => {
                        (StatusCode::BAD_REQUEST, ApiError::new("INVALID_DATE", msg))
                    }
                    CalendarError::InvalidObserver(_) => {
                        (StatusCode::BAD_REQUEST, ApiError::new("INVALID_OBSERVER", msg))
                    }
                }
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        AppError::Calendar(err)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Task join error: {}", err))
    }
}
