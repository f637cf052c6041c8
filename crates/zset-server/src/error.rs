use std::any::Any;
use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use zset_protocol::{ErrorEnvelope, ProtocolError};
use zset_store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// A failed request: the status plus the description carried in the
/// `{description, code}` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub description: String,
}

impl ApiError {
    pub fn new(status: StatusCode, description: impl Into<String>) -> Self {
        Self {
            status,
            description: description.into(),
        }
    }

    pub fn invalid(description: impl fmt::Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, description.to_string())
    }

    pub fn not_found(description: impl fmt::Display) -> Self {
        Self::new(StatusCode::NOT_FOUND, description.to_string())
    }

    /// Store failures surface verbatim with a 500.
    pub fn store(err: StoreError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }

    /// Like [`store`](Self::store), except a missing record maps to 404.
    pub fn lookup(err: StoreError) -> Self {
        if err.is_not_found() {
            Self::not_found(err)
        } else {
            Self::store(err)
        }
    }
}

impl From<ProtocolError> for ApiError {
    fn from(err: ProtocolError) -> Self {
        Self::invalid(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, description = %self.description, "request failed");
        } else {
            tracing::warn!(status = %self.status, description = %self.description, "request rejected");
        }
        let body = ErrorEnvelope::new(self.status.as_u16(), self.description);
        (self.status, Json(body)).into_response()
    }
}

/// Response for a handler that panicked: a 500 envelope carrying the
/// panic message.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(text) = panic.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = panic.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("handler panicked: {detail}"),
    )
    .into_response()
}
