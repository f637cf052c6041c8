use std::collections::BTreeSet;
use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::encoding::{base64_bytes, encode_value};
use crate::name::Field;

/// A full record: this field holds this value with this score.
///
/// The value is opaque and may contain any bytes; on the wire it is framed
/// as base64 text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldValueScore {
    pub field: Field,
    #[serde(with = "base64_bytes")]
    pub value: Bytes,
    pub score: i64,
}

impl FieldValueScore {
    pub fn new(field: Field, value: impl Into<Bytes>, score: i64) -> Self {
        Self {
            field,
            value: value.into(),
            score,
        }
    }

    /// Drop the value payload, keeping the field and its score.
    pub fn field_score(&self) -> FieldScore {
        FieldScore {
            field: self.field.clone(),
            score: self.score,
        }
    }
}

impl fmt::Display for FieldValueScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={} @{}",
            self.field,
            encode_value(&self.value),
            self.score
        )
    }
}

/// The score-bearing projection of a [`FieldValueScore`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldScore {
    pub field: Field,
    pub score: i64,
}

impl fmt::Display for FieldScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @{}", self.field, self.score)
    }
}

/// The state of one field as observed by an operation.
///
/// - `present`: the field existed before the operation.
/// - `inserted`: the operation just placed or updated the record.
/// - `score`: the score now stored for the field, zero when absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Presence {
    pub present: bool,
    pub inserted: bool,
    pub score: i64,
}

impl Presence {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn stored(score: i64) -> Self {
        Self {
            present: true,
            inserted: false,
            score,
        }
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "present={} inserted={} score={}",
            self.present, self.inserted, self.score
        )
    }
}

/// Which members of a mutation batch were accepted and which were rejected.
///
/// A field appears in at most one of the two sets: when a batch names the
/// same field more than once, the disposition of its last occurrence is the
/// one reported.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub success: BTreeSet<Field>,
    pub failure: BTreeSet<Field>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the disposition of `field`, replacing any earlier one.
    pub fn record(&mut self, field: Field, accepted: bool) {
        if accepted {
            self.failure.remove(&field);
            self.success.insert(field);
        } else {
            self.success.remove(&field);
            self.failure.insert(field);
        }
    }

    pub fn accepted(&self, field: &Field) -> bool {
        self.success.contains(field)
    }

    pub fn rejected(&self, field: &Field) -> bool {
        self.failure.contains(field)
    }

    /// Number of distinct fields reported.
    pub fn len(&self) -> usize {
        self.success.len() + self.failure.len()
    }

    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.failure.is_empty()
    }
}

impl fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |set: &BTreeSet<Field>| {
            set.iter()
                .map(Field::as_str)
                .collect::<Vec<_>>()
                .join(",")
        };
        write!(
            f,
            "success=[{}] failure=[{}]",
            join(&self.success),
            join(&self.failure)
        )
    }
}
