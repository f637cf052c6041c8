//! In-memory sorted-set storage for zset.
//!
//! A [`Store`] maps each [`Key`](zset_types::Key) to a [`KeyBucket`]: a
//! collection of fields ordered by score, where the highest score ever
//! observed for a field wins. The store is never shared directly; a single
//! [`Serialiser`] worker owns it and executes operations one at a time in
//! dequeue order, while any number of cloned [`StoreHandle`]s submit work.
//!
//! # Write-wins rules
//!
//! 1. Insert replaces a record iff the incoming score is `>=` the stored one.
//! 2. Delete removes a record iff the incoming score is `>=` the stored one.
//! 3. Buckets are created on the first insert against a key and are never
//!    removed, so `keys()` reports every key ever inserted into.
//!
//! # Capability
//!
//! The seven operations are expressed by the [`KeyStore`] trait. The
//! in-process [`StoreHandle`] implements it, and so does every remote
//! transport, so callers compose over either without knowing which.

pub mod bucket;
pub mod error;
pub mod memory;
pub mod serialiser;
pub mod traits;

pub use bucket::KeyBucket;
pub use error::{ErrorKind, StoreError, StoreResult};
pub use memory::Store;
pub use serialiser::{Serialiser, StoreHandle};
pub use traits::KeyStore;
