use std::collections::BTreeMap;

use tracing::debug;
use zset_types::{ChangeSet, Field, FieldValueScore, Key, Presence};

use crate::bucket::KeyBucket;
use crate::error::{StoreError, StoreResult};

/// Mapping from [`Key`] to [`KeyBucket`]; owns all mutable state.
///
/// A bucket is created on the first insert against a key and is kept even
/// once emptied, so [`keys`](Self::keys) reports every key ever inserted
/// into. The store is not synchronised: it is meant to be owned by a single
/// [`Serialiser`](crate::Serialiser) worker.
#[derive(Debug, Default)]
pub struct Store {
    buckets: BTreeMap<Key, KeyBucket>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &Key, members: Vec<FieldValueScore>) -> StoreResult<ChangeSet> {
        let bucket = self.buckets.entry(key.clone()).or_default();
        let changes = bucket.insert(members);
        debug!(
            key = %key,
            accepted = changes.success.len(),
            rejected = changes.failure.len(),
            "insert applied"
        );
        Ok(changes)
    }

    /// Delete against a key that was never inserted into rejects every
    /// member and does not create a bucket.
    pub fn delete(&mut self, key: &Key, members: Vec<FieldValueScore>) -> StoreResult<ChangeSet> {
        let changes = match self.buckets.get_mut(key) {
            Some(bucket) => bucket.delete(members),
            None => {
                let mut changes = ChangeSet::new();
                for member in members {
                    changes.record(member.field, false);
                }
                changes
            }
        };
        debug!(
            key = %key,
            accepted = changes.success.len(),
            rejected = changes.failure.len(),
            "delete applied"
        );
        Ok(changes)
    }

    pub fn select(&self, key: &Key, field: &Field) -> StoreResult<FieldValueScore> {
        self.buckets
            .get(key)
            .and_then(|bucket| bucket.select(field))
            .ok_or_else(|| StoreError::NotFound {
                key: key.clone(),
                field: field.clone(),
            })
    }

    /// Every key ever created against this store, in byte order.
    pub fn keys(&self) -> StoreResult<Vec<Key>> {
        Ok(self.buckets.keys().cloned().collect())
    }

    pub fn size(&self, key: &Key) -> StoreResult<i64> {
        Ok(self.buckets.get(key).map(KeyBucket::size).unwrap_or(0))
    }

    pub fn members(&self, key: &Key) -> StoreResult<Vec<Field>> {
        Ok(self
            .buckets
            .get(key)
            .map(KeyBucket::members)
            .unwrap_or_default())
    }

    pub fn score(&self, key: &Key, field: &Field) -> StoreResult<Presence> {
        Ok(self
            .buckets
            .get(key)
            .map(|bucket| bucket.score(field))
            .unwrap_or_else(Presence::absent))
    }

    pub fn bucket(&self, key: &Key) -> Option<&KeyBucket> {
        self.buckets.get(key)
    }

    /// Number of buckets ever created.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
