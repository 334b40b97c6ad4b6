//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use confab_types::error::{RepositoryError, SessionError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Session-manager errors.
    Session(SessionError),
    /// Storage errors outside a session (direct reads).
    Repository(RepositoryError),
    /// Authentication failure.
    Unauthorized(String),
    /// Validation error.
    Validation(String),
    /// Missing resource.
    NotFound(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Repository(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Session(SessionError::SendInFlight) => (
                StatusCode::CONFLICT,
                "SEND_IN_FLIGHT",
                "A send is already in flight for this session".to_string(),
            ),
            AppError::Session(SessionError::NotAuthenticated) => (
                StatusCode::UNAUTHORIZED,
                "NOT_AUTHENTICATED",
                "Session has no resolved identity".to_string(),
            ),
            AppError::Session(SessionError::NoActiveConversation) => (
                StatusCode::BAD_REQUEST,
                "NO_ACTIVE_CONVERSATION",
                "Choose a personality or select a conversation first".to_string(),
            ),
            AppError::Session(SessionError::InvalidRosterIndex(index)) => (
                StatusCode::BAD_REQUEST,
                "INVALID_ROSTER_INDEX",
                format!("Roster index {index} out of range"),
            ),
            AppError::Session(SessionError::Completion(e)) => {
                (StatusCode::BAD_GATEWAY, "COMPLETION_FAILED", e.to_string())
            }
            AppError::Session(SessionError::Store(e)) => {
                (StatusCode::BAD_GATEWAY, "STORE_FAILED", e.to_string())
            }
            AppError::Repository(RepositoryError::NotFound) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Resource not found".to_string(),
            ),
            AppError::Repository(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                e.to_string(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
        };

        let resp = ApiResponse::error(code, &message, Uuid::now_v7().to_string(), 0);
        (status, Json(resp)).into_response()
    }
}
