use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

use crate::auth::resolver::AuthFailure;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Authentication required but not provided, or credentials rejected
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Invalid request data or business rule violation
    #[error("{message}")]
    BadRequest { message: String },

    /// Credential store did not answer in time or reported itself down.
    /// Retryable, and never an authentication denial.
    #[error("Credential store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "Authentication required".to_string()),
            Error::BadRequest { message } => message.clone(),
            Error::StoreUnavailable { .. } => "Service temporarily unavailable, please retry".to_string(),
            Error::Internal { .. } => "Internal server error".to_string(),
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity
        match &self {
            Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::StoreUnavailable { .. } => {
                tracing::warn!("Dependency error: {}", self);
            }
            Error::Unauthenticated { .. } => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::BadRequest { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        (self.status_code(), self.user_message()).into_response()
    }
}

/// Collapse resolver failures into the HTTP surface. The three credential
/// failures map to one generic message so callers cannot distinguish an
/// unknown identifier from a wrong secret.
impl From<AuthFailure> for Error {
    fn from(failure: AuthFailure) -> Self {
        match failure {
            AuthFailure::MalformedRequest { reason } => Error::BadRequest {
                message: reason.to_string(),
            },
            AuthFailure::NotFound | AuthFailure::InvalidSecret | AuthFailure::NoCredentialSet => Error::Unauthenticated {
                message: Some("Invalid credentials".to_string()),
            },
            AuthFailure::StoreUnavailable { reason } => Error::StoreUnavailable { reason },
        }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
