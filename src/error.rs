use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::{dao::storage::StorageError, state::match_machine::InvalidTransition};

/// Errors that can occur in service layer operations.
///
/// Everything except `Unavailable`/`Degraded` is an *expected* outcome of the
/// reporting protocol, surfaced to the presentation layer as a message.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Malformed match identifier, rejected before any lookup.
    #[error("invalid match identifier: {0}")]
    InvalidIdentifier(String),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested match or participant was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Acting identity is not the right participant for the operation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// A conditional update matched zero rows: the match moved underneath
    /// the caller and the request should be retried against fresh state.
    #[error("match state changed concurrently: {0}")]
    StaleState(String),
    /// The check-in window has closed.
    #[error("check-in deadline has passed")]
    DeadlineExpired,
    /// Operation attempted on a match already in a terminal state.
    #[error("match already finalized: {0}")]
    AlreadyFinalized(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<InvalidTransition> for ServiceError {
    fn from(err: InvalidTransition) -> Self {
        if err.from.is_terminal() {
            ServiceError::AlreadyFinalized(err.to_string())
        } else {
            ServiceError::StaleState(err.to_string())
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::InvalidIdentifier(message) => {
                AppError::BadRequest(format!("invalid match identifier: {message}"))
            }
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Unauthorized(message) => AppError::Unauthorized(message),
            ServiceError::StaleState(message) => AppError::Conflict(message),
            ServiceError::DeadlineExpired => {
                AppError::Conflict("check-in deadline has passed".into())
            }
            ServiceError::AlreadyFinalized(message) => AppError::Conflict(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
