//! Foundation types for zset.
//!
//! zset is an in-memory store of keys, each addressing a sorted set of
//! fields. Every field holds an opaque value and a signed 64-bit score, and
//! the highest score ever observed for a field wins. Every other zset crate
//! depends on `zset-types`.
//!
//! # Key Types
//!
//! - [`Key`]: Non-empty identifier addressing one bucket
//! - [`Field`]: Non-empty identifier of a record within a bucket
//! - [`FieldValueScore`]: A full record: field, opaque value, score
//! - [`FieldScore`]: The score-bearing projection of a record
//! - [`Presence`]: Whether a field is stored, and at which score
//! - [`ChangeSet`]: Accepted and rejected fields of a mutation batch

pub mod encoding;
pub mod error;
pub mod name;
pub mod record;

pub use error::TypeError;
pub use name::{Field, Key};
pub use record::{ChangeSet, FieldScore, FieldValueScore, Presence};
