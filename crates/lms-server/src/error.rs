//! API error type and its JSON rendering.
//!
//! Every handler returns `Result<_, ApiError>`. Client errors carry the
//! message shown to the caller; anything unexpected is logged and rendered
//! as a bare 500.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lms_auth::AuthError;
use lms_db::error::DatabaseError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    /// Request body failed validation; `errors` lists each problem.
    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub const fn forbidden() -> Self {
        Self::Forbidden("Forbidden")
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Unauthenticated | Self::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, self.to_string()),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            Self::BadRequest(_) | Self::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            Self::Database(DatabaseError::NoResult) => {
                (StatusCode::NOT_FOUND, "Resource not found".to_string())
            }
            Self::Database(
                DatabaseError::Conflict(msg)
                | DatabaseError::Validation(msg)
                | DatabaseError::InvalidState(msg),
            ) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Database(e) if e.is_unique_violation() => {
                (StatusCode::BAD_REQUEST, "Duplicate entry".to_string())
            }
            Self::Auth(AuthError::UnknownProvider(_) | AuthError::ProviderNotConfigured(_)) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            Self::Auth(AuthError::StateMismatch) => (StatusCode::BAD_REQUEST, self.to_string()),
            Self::Database(_) | Self::Auth(_) | Self::Session(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(%status, %message, "request rejected");
        }

        let errors = match self {
            Self::Validation(errors) => Some(errors),
            Self::Database(DatabaseError::Validation(msg)) => Some(vec![msg]),
            _ => None,
        };
        let message = if errors.is_some() {
            "Validation failed".to_string()
        } else {
            message
        };

        (status, Json(ErrorBody { message, errors })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(vec![rejection.body_text()])
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge("File too large".into())
        } else {
            Self::BadRequest(err.body_text())
        }
    }
}

/// Attach a resource name to a `NoResult` lookup.
pub trait OrNotFound<T> {
    fn or_not_found(self, what: &str) -> Result<T, ApiError>;
}

impl<T> OrNotFound<T> for Result<T, DatabaseError> {
    fn or_not_found(self, what: &str) -> Result<T, ApiError> {
        self.map_err(|e| match e {
            DatabaseError::NoResult => ApiError::not_found(what),
            other => ApiError::Database(other),
        })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
