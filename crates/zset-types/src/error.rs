use thiserror::Error;

/// Errors produced by type construction and decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },

    #[error("invalid base64 value: {0}")]
    InvalidBase64(String),
}
