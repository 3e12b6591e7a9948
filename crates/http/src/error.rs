//! Error handling for the SHELF HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::envelope::respond;

/// Failures a handler or middleware can end a request with. Each renders
/// as the standard envelope without `data`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body could not be parsed into the expected shape.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Missing, malformed or expired token, or rejected login.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// A dependency failed (store write, token signing). `message` is sent
    /// to the client; `source` is only logged.
    #[error("{message}: {source}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            AppError::InvalidInput(message)
            | AppError::Unauthorized(message)
            | AppError::NotFound(message) => {
                tracing::debug!(status_code = status.as_u16(), %message, "request rejected");
                message
            }
            AppError::Internal { message, source } => {
                tracing::error!(
                    status_code = status.as_u16(),
                    %message,
                    error = ?source,
                    "request failed"
                );
                message
            }
        };

        respond::<()>(status, message, None).into_response()
    }
}
