use serde::{Deserialize, Serialize};
use zset_types::FieldValueScore;

use crate::error::{ProtocolError, ProtocolResult};

/// Body of an insert or delete request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembersRequest {
    pub members: Vec<FieldValueScore>,
}

/// Wrapper of every success payload: `{"records": <payload>}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Records<T> {
    pub records: T,
}

impl<T> Records<T> {
    pub fn new(records: T) -> Self {
        Self { records }
    }

    pub fn into_inner(self) -> T {
        self.records
    }
}

/// Body of every error reply; `code` repeats the HTTP status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub description: String,
    pub code: u16,
}

impl ErrorEnvelope {
    pub fn new(code: u16, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            code,
        }
    }
}

/// Decode a `{"members": [{field, value, score}, ...]}` body.
///
/// The three failure modes are kept apart: an empty body, a body that is not
/// JSON at all, and JSON that does not have the members shape (including
/// empty fields and values that are not base64).
pub fn decode_members(body: &[u8]) -> ProtocolResult<Vec<FieldValueScore>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ProtocolError::EmptyBody);
    }
    let document: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| ProtocolError::MalformedJson(e.to_string()))?;
    let request: MembersRequest = serde_json::from_value(document)
        .map_err(|e| ProtocolError::InvalidMembers(e.to_string()))?;
    Ok(request.members)
}
