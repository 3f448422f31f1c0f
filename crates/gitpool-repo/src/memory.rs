//! In-memory registry for tests and embedding.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use gitpool_refs::MemoryRefsContainer;
use gitpool_store::MemoryObjectStore;

use crate::error::{RepoError, RepoResult};
use crate::registry::{check_repo_name, Backend};
use crate::repository::Repository;

struct Tenant {
    objects: Arc<MemoryObjectStore>,
    refs: Arc<MemoryRefsContainer>,
}

/// Registry keeping every tenant in process memory.
///
/// Unlike the database variant, namespaces here are explicit: `open` on
/// an unknown name fails with `NotFound`, which is the path the
/// dispatcher turns into a 404.
#[derive(Default)]
pub struct MemoryBackend {
    tenants: RwLock<HashMap<String, Tenant>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn create(&self, name: &str) -> RepoResult<Repository> {
        check_repo_name(name)?;
        let mut tenants = self.tenants.write().expect("lock poisoned");
        if tenants.contains_key(name) {
            return Err(RepoError::AlreadyExists(name.to_string()));
        }
        let tenant = Tenant {
            objects: Arc::new(MemoryObjectStore::new()),
            refs: Arc::new(MemoryRefsContainer::new()),
        };
        let repo = Repository::new(name, tenant.objects.clone(), tenant.refs.clone());
        tenants.insert(name.to_string(), tenant);
        Ok(repo)
    }

    async fn open(&self, name: &str) -> RepoResult<Repository> {
        let tenants = self.tenants.read().expect("lock poisoned");
        let tenant = tenants
            .get(name)
            .ok_or_else(|| RepoError::NotFound(name.to_string()))?;
        Ok(Repository::new(
            name,
            tenant.objects.clone(),
            tenant.refs.clone(),
        ))
    }

    async fn exists(&self, name: &str) -> RepoResult<bool> {
        Ok(self
            .tenants
            .read()
            .expect("lock poisoned")
            .contains_key(name))
    }

    async fn list(&self) -> RepoResult<Vec<String>> {
        let mut names: Vec<String> = self
            .tenants
            .read()
            .expect("lock poisoned")
            .keys()
            .cloned()
            .collect();
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> RepoResult<()> {
        if let Some(tenant) = self.tenants.write().expect("lock poisoned").remove(name) {
            tenant.objects.clear();
            tenant.refs.clear();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use gitpool_refs::{RefTarget, HEAD_REF};
    use gitpool_types::{ObjectId, ObjectKind, RawObject};

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn create_open_exists_list_delete() {
        let backend = MemoryBackend::new();
        assert!(!backend.exists("demo").await.unwrap());

        backend.create("demo").await.unwrap();
        assert!(backend.exists("demo").await.unwrap());
        assert_eq!(backend.list().await.unwrap(), vec!["demo".to_string()]);
        backend.open("demo").await.unwrap();

        backend.delete("demo").await.unwrap();
        assert!(!backend.exists("demo").await.unwrap());
        assert!(backend.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_twice_fails() {
        let backend = MemoryBackend::new();
        backend.create("demo").await.unwrap();
        assert!(matches!(
            backend.create("demo").await,
            Err(RepoError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn open_unknown_fails() {
        let backend = MemoryBackend::new();
        assert!(matches!(
            backend.open("ghost").await,
            Err(RepoError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn invalid_names_are_rejected() {
        let backend = MemoryBackend::new();
        assert!(matches!(
            backend.create("a/b").await,
            Err(RepoError::InvalidName { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Tenant isolation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn tenants_do_not_see_each_other() {
        let backend = MemoryBackend::new();
        let a = backend.create("tenant-a").await.unwrap();
        let b = backend.create("tenant-b").await.unwrap();

        let obj = RawObject::new(ObjectKind::Blob, &b"private"[..]);
        a.objects().put(&obj).await.unwrap();
        a.refs()
            .compare_and_swap(HEAD_REF, None, RefTarget::Id(obj.id()))
            .await
            .unwrap();

        assert!(!b.objects().contains(&obj.id()).await.unwrap());
        assert!(b.refs().read(HEAD_REF).await.unwrap().is_none());
        assert!(b.refs().list_names().await.unwrap().is_empty());
        assert!(b.objects().all_ids().await.unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // End-to-end scenario
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn repository_lifecycle_end_to_end() {
        let backend = MemoryBackend::new();
        let repo = backend.create("demo").await.unwrap();

        let blob = RawObject::new(ObjectKind::Blob, &b"hello"[..]);
        repo.objects().put(&blob).await.unwrap();
        assert!(repo.objects().contains(&blob.id()).await.unwrap());

        let tip = ObjectId::hash_object(ObjectKind::Commit, b"pretend commit");
        assert!(repo
            .refs()
            .compare_and_swap(HEAD_REF, None, RefTarget::Id(tip))
            .await
            .unwrap());
        assert_eq!(
            repo.refs().read(HEAD_REF).await.unwrap(),
            Some(RefTarget::Id(tip))
        );
        assert_eq!(repo.head().await.unwrap(), Some(tip));

        backend.delete("demo").await.unwrap();
        assert!(!backend.exists("demo").await.unwrap());
        assert!(!backend
            .list()
            .await
            .unwrap()
            .contains(&"demo".to_string()));
    }
}
