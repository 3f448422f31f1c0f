//! In-memory object store for tests and embedding.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use gitpool_types::{ObjectId, RawObject};

use crate::error::{StoreError, StoreResult};
use crate::traits::ObjectStore;

/// `HashMap`-based object store holding one repository's namespace.
///
/// Objects live in memory behind a `RwLock` and are cloned on read.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, RawObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Drop every object. Used by registry deletion.
    pub fn clear(&self) {
        self.objects.write().expect("lock poisoned").clear();
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn contains(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self
            .objects
            .read()
            .expect("lock poisoned")
            .contains_key(id))
    }

    async fn get(&self, id: &ObjectId) -> StoreResult<RawObject> {
        self.objects
            .read()
            .expect("lock poisoned")
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound(*id))
    }

    async fn put(&self, obj: &RawObject) -> StoreResult<()> {
        let mut map = self.objects.write().expect("lock poisoned");
        // Idempotent: keep the existing row for a duplicate id.
        map.entry(obj.id()).or_insert_with(|| obj.clone());
        Ok(())
    }

    async fn put_many(&self, objs: &[RawObject]) -> StoreResult<()> {
        let mut map = self.objects.write().expect("lock poisoned");
        for obj in objs {
            map.entry(obj.id()).or_insert_with(|| obj.clone());
        }
        Ok(())
    }

    async fn delete(&self, ids: &[ObjectId]) -> StoreResult<()> {
        let mut map = self.objects.write().expect("lock poisoned");
        for id in ids {
            map.remove(id);
        }
        Ok(())
    }

    async fn all_ids(&self) -> StoreResult<Vec<ObjectId>> {
        let mut ids: Vec<ObjectId> = self
            .objects
            .read()
            .expect("lock poisoned")
            .keys()
            .copied()
            .collect();
        ids.sort();
        Ok(ids)
    }
}

impl std::fmt::Debug for MemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryObjectStore")
            .field("object_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitpool_types::ObjectKind;

    fn blob(data: &[u8]) -> RawObject {
        RawObject::new(ObjectKind::Blob, data.to_vec())
    }

    #[tokio::test]
    async fn put_then_get() {
        let store = MemoryObjectStore::new();
        let obj = blob(b"hello world");
        store.put(&obj).await.unwrap();
        assert!(store.contains(&obj.id()).await.unwrap());
        assert_eq!(store.get(&obj.id()).await.unwrap(), obj);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = MemoryObjectStore::new();
        let id = blob(b"never stored").id();
        assert!(matches!(
            store.get(&id).await,
            Err(StoreError::NotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn put_is_idempotent() {
        let store = MemoryObjectStore::new();
        let obj = blob(b"same twice");
        store.put(&obj).await.unwrap();
        store.put(&obj).await.unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.contains(&obj.id()).await.unwrap());
    }

    #[tokio::test]
    async fn put_many_and_all_ids() {
        let store = MemoryObjectStore::new();
        let objs = vec![blob(b"a"), blob(b"b"), blob(b"c")];
        store.put_many(&objs).await.unwrap();
        let ids = store.all_ids().await.unwrap();
        assert_eq!(ids.len(), 3);
        for obj in &objs {
            assert!(ids.contains(&obj.id()));
        }
    }

    #[tokio::test]
    async fn delete_is_quiet_about_absent_ids() {
        let store = MemoryObjectStore::new();
        let present = blob(b"present");
        store.put(&present).await.unwrap();
        let absent = blob(b"absent").id();
        store.delete(&[present.id(), absent]).await.unwrap();
        assert!(store.is_empty());
    }
}
