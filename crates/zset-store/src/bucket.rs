use std::collections::{BTreeSet, HashMap};

use bytes::Bytes;
use zset_types::{ChangeSet, Field, FieldScore, FieldValueScore, Presence};

#[derive(Clone, Debug)]
struct Record {
    value: Bytes,
    score: i64,
}

/// The store entry for one key: fields ordered by score under the
/// write-wins policy.
///
/// Scores are caller-assigned ordering tokens. An insert with a lower score
/// than the stored one is a stale retry and is rejected; a delete with a
/// lower score would raze a newer insert and is rejected too.
///
/// Invariants:
/// - At most one record per field.
/// - `by_score` holds exactly one `(score, field)` entry per record.
#[derive(Clone, Debug, Default)]
pub struct KeyBucket {
    records: HashMap<Field, Record>,
    by_score: BTreeSet<(i64, Field)>,
}

impl KeyBucket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply each member in input order under the write-wins rule.
    ///
    /// A member is accepted when its field is absent or its score is at
    /// least the stored one; accepted members replace value and score.
    pub fn insert(&mut self, members: impl IntoIterator<Item = FieldValueScore>) -> ChangeSet {
        let mut changes = ChangeSet::new();
        for member in members {
            let field = member.field.clone();
            let accepted = self.put(member);
            changes.record(field, accepted);
        }
        changes
    }

    /// Remove each member whose score is at least the stored one.
    ///
    /// Absent fields and stale scores are reported as failures. Values in
    /// the input are ignored.
    pub fn delete(&mut self, members: impl IntoIterator<Item = FieldValueScore>) -> ChangeSet {
        let mut changes = ChangeSet::new();
        for member in members {
            let accepted = self.remove(&member.field, member.score);
            changes.record(member.field, accepted);
        }
        changes
    }

    pub fn select(&self, field: &Field) -> Option<FieldValueScore> {
        self.records
            .get(field)
            .map(|record| FieldValueScore::new(field.clone(), record.value.clone(), record.score))
    }

    /// Stored fields in ascending score order, ties broken by field.
    pub fn members(&self) -> Vec<Field> {
        self.by_score.iter().map(|(_, field)| field.clone()).collect()
    }

    /// The score projection of every record, in the order of [`members`](Self::members).
    pub fn scores(&self) -> impl Iterator<Item = FieldScore> + '_ {
        self.by_score.iter().map(|(score, field)| FieldScore {
            field: field.clone(),
            score: *score,
        })
    }

    pub fn size(&self) -> i64 {
        self.records.len() as i64
    }

    pub fn score(&self, field: &Field) -> Presence {
        self.records
            .get(field)
            .map(|record| Presence::stored(record.score))
            .unwrap_or_else(Presence::absent)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn put(&mut self, member: FieldValueScore) -> bool {
        let FieldValueScore { field, value, score } = member;
        match self.records.get_mut(&field) {
            Some(record) if score < record.score => false,
            Some(record) => {
                if record.score != score {
                    self.by_score.remove(&(record.score, field.clone()));
                    self.by_score.insert((score, field));
                }
                record.value = value;
                record.score = score;
                true
            }
            None => {
                self.by_score.insert((score, field.clone()));
                self.records.insert(field, Record { value, score });
                true
            }
        }
    }

    fn remove(&mut self, field: &Field, score: i64) -> bool {
        match self.records.get(field) {
            Some(record) if score >= record.score => {
                self.by_score.remove(&(record.score, field.clone()));
                self.records.remove(field);
                true
            }
            _ => false,
        }
    }
}
