// crates/backend-lib/src/error.rs

//! Central error type + the uniform error envelope.
use authkit_common::{ErrorEnvelope, ErrorMessage, FieldErrors};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use thiserror::Error;

use crate::auth::TokenError;
use crate::storage::StoreError;

/// Message returned when registration hits a uniqueness conflict
pub const USER_EXISTS_MESSAGE: &str = "User with this username or email already exists.";

/// Message returned when login names an unknown email
pub const USER_NOT_FOUND_MESSAGE: &str = "User not found";

/// Message returned when login presents the wrong password
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

const INTERNAL_MESSAGE: &str = "An internal server error occurred";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("{0}")]
    MalformedBody(String),

    #[error("{}", USER_EXISTS_MESSAGE)]
    UserExists,

    #[error("{}", USER_NOT_FOUND_MESSAGE)]
    UserNotFound,

    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,

    #[error("Storage error: {0}")]
    Store(StoreError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::MalformedBody(_) | AppError::UserExists => {
                StatusCode::BAD_REQUEST
            },
            AppError::UserNotFound | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Store(_) | AppError::Token(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Short label for the envelope's `error` member
    pub fn label(&self) -> &'static str {
        self.status_code().canonical_reason().unwrap_or("Error")
    }

    /// Envelope `message`; server-side failures never echo their cause
    pub fn message(&self) -> ErrorMessage {
        match self {
            AppError::Validation(fields) => ErrorMessage::Fields(fields.clone()),
            AppError::Store(_) | AppError::Token(_) | AppError::Internal(_) => {
                ErrorMessage::from(INTERNAL_MESSAGE)
            },
            other => ErrorMessage::Detail(other.to_string()),
        }
    }

    /// Render this error as an envelope response for the request at `path`
    pub fn into_response_at(self, path: &str) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, path, "request failed");
            metrics::counter!(crate::metrics::ERROR_INTERNAL).increment(1);
        } else {
            tracing::debug!(error = %self, path, status = status.as_u16(), "request rejected");
        }
        format_error(path, status, self.label(), self.message())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => AppError::UserExists,
            other => AppError::Store(other),
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("blocking task failed: {err}"))
    }
}

/// Build the uniform error response.
///
/// Every failing request goes through here so that clients always receive
/// `{timestamp, status, error, message, path}`.
pub fn format_error(
    path: &str,
    status: StatusCode,
    error: &str,
    message: impl Into<ErrorMessage>,
) -> Response {
    let envelope = ErrorEnvelope::new(path, status.as_u16(), error, message, Utc::now());
    (status, Json(envelope)).into_response()
}
