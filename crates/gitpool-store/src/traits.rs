use async_trait::async_trait;

use gitpool_types::{ObjectId, RawObject};

use crate::error::StoreResult;

/// Tenant-scoped content-addressable object store.
///
/// All implementations must satisfy these invariants:
/// - An object's id is a deterministic hash of its kind and payload, so
///   two writes of the same id are equivalent.
/// - `put` is idempotent: a duplicate id is silently accepted and the
///   stored row is never overwritten.
/// - A batch either commits whole or not at all.
/// - Nothing written under one repository is visible through a store
///   scoped to another.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Whether the object is present.
    async fn contains(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Fetch an object. `StoreError::NotFound` when absent.
    async fn get(&self, id: &ObjectId) -> StoreResult<RawObject>;

    /// Idempotent insert.
    async fn put(&self, obj: &RawObject) -> StoreResult<()>;

    /// Batched idempotent insert; all-or-nothing.
    async fn put_many(&self, objs: &[RawObject]) -> StoreResult<()>;

    /// Remove the given ids. Absent ids are not an error.
    async fn delete(&self, ids: &[ObjectId]) -> StoreResult<()>;

    /// Every object id in this repository's namespace.
    ///
    /// Reissues the underlying query on each call; visibility of
    /// concurrent writers is whatever read-committed gives.
    async fn all_ids(&self) -> StoreResult<Vec<ObjectId>>;
}
