use async_trait::async_trait;
use zset_types::{ChangeSet, Field, FieldValueScore, Key, Presence};

use crate::error::StoreResult;

/// The seven-operation capability of a zset store.
///
/// Implemented by the in-process [`StoreHandle`](crate::StoreHandle) and by
/// remote transports, so pools and routers can be built over either.
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Insert members under the write-wins rule.
    async fn insert(&self, key: &Key, members: Vec<FieldValueScore>) -> StoreResult<ChangeSet>;

    /// Delete members whose score is at least the stored one.
    async fn delete(&self, key: &Key, members: Vec<FieldValueScore>) -> StoreResult<ChangeSet>;

    /// Read one record. Fails with a not-found error when the field is absent.
    async fn select(&self, key: &Key, field: &Field) -> StoreResult<FieldValueScore>;

    /// Every key ever inserted into.
    async fn keys(&self) -> StoreResult<Vec<Key>>;

    async fn size(&self, key: &Key) -> StoreResult<i64>;

    async fn members(&self, key: &Key) -> StoreResult<Vec<Field>>;

    /// Presence of a field. Never fails for an absent field.
    async fn score(&self, key: &Key, field: &Field) -> StoreResult<Presence>;
}
