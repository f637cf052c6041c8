//! Wire protocol for zset.
//!
//! Defines the HTTP paths of the seven operations, the diagnostic header
//! names, and the JSON envelopes exchanged between clients and servers:
//! `{"members": [...]}` mutation bodies, `{"records": ...}` success replies
//! and `{"description": ..., "code": ...}` error replies.

pub mod endpoint;
pub mod envelope;
pub mod error;

pub use endpoint::{endpoints, headers, params, Operation, JSON_CONTENT_TYPE};
pub use envelope::{decode_members, ErrorEnvelope, MembersRequest, Records};
pub use error::{ProtocolError, ProtocolResult};
