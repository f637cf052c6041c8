use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("empty request body")]
    EmptyBody,

    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    #[error("invalid members document: {0}")]
    InvalidMembers(String),

    #[error("unexpected content type: {0}")]
    ContentType(String),

    #[error("missing query parameter: {0}")]
    MissingParameter(&'static str),

    #[error("invalid query parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
