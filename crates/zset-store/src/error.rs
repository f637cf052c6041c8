use zset_types::{Field, Key};

/// The three classes every failure falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad user input or a failed decode.
    Invalid,
    /// A missing key, field or route.
    NotFound,
    /// A failure on the implementation side.
    Internal,
}

/// Errors from store operations, local or remote.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The addressed field is not stored under the key.
    #[error("field {field} not found under key {key}")]
    NotFound { key: Key, field: Field },

    /// A decoding or precondition failure.
    #[error("invalid request: {0}")]
    Invalid(String),

    /// Catch-all for bucket-level failures.
    #[error("internal error: {0}")]
    Internal(String),

    /// The serialiser has stopped and no longer accepts work.
    #[error("store is shut down")]
    Shutdown,

    /// A remote call could not be completed or its reply could not be decoded.
    #[error("transport error: {0}")]
    Transport(String),

    /// A remote endpoint answered with a non-success status.
    #[error("remote error {code}: {description}")]
    Remote { code: u16, description: String },
}

impl StoreError {
    /// Recognise a not-found failure, whether raised locally or relayed by
    /// a remote endpoint.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Remote { code, .. } => *code == 404,
            _ => false,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Invalid(_) => ErrorKind::Invalid,
            Self::Remote { code, .. } if *code == 404 => ErrorKind::NotFound,
            Self::Remote { code, .. } if (400..500).contains(code) => ErrorKind::Invalid,
            Self::Internal(_) | Self::Shutdown | Self::Transport(_) | Self::Remote { .. } => {
                ErrorKind::Internal
            }
        }
    }
}

impl From<zset_types::TypeError> for StoreError {
    fn from(err: zset_types::TypeError) -> Self {
        Self::Invalid(err.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
