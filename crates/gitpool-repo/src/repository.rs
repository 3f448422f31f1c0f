use std::sync::Arc;

use gitpool_refs::{RefsContainer, HEAD_REF};
use gitpool_store::ObjectStore;
use gitpool_types::ObjectId;

use crate::error::{RepoError, RepoResult};

/// Handle onto one tenant's namespace.
///
/// Repositories here are always bare: objects and refs only, no working
/// tree and no index. The handle owns nothing but the name — the stores
/// it carries are views onto shared storage scoped to that name.
pub struct Repository {
    name: String,
    objects: Arc<dyn ObjectStore>,
    refs: Arc<dyn RefsContainer>,
}

impl Repository {
    pub fn new(
        name: impl Into<String>,
        objects: Arc<dyn ObjectStore>,
        refs: Arc<dyn RefsContainer>,
    ) -> Self {
        Self {
            name: name.into(),
            objects,
            refs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn objects(&self) -> &dyn ObjectStore {
        self.objects.as_ref()
    }

    pub fn refs(&self) -> &dyn RefsContainer {
        self.refs.as_ref()
    }

    /// The object the head pointer currently resolves to.
    pub async fn head(&self) -> RepoResult<Option<ObjectId>> {
        Ok(self.refs.resolve(HEAD_REF).await?)
    }

    /// Bare repositories have no index; this always fails with the typed
    /// unsupported-operation error.
    pub fn open_index(&self) -> RepoResult<()> {
        Err(RepoError::NoIndex)
    }

    /// Every ref with the object id it resolves to, for advertisement.
    ///
    /// Symbolic refs are followed; dangling ones are skipped.
    pub async fn advertised_refs(&self) -> RepoResult<Vec<(String, ObjectId)>> {
        let mut out = Vec::new();
        for name in self.refs.list_names().await? {
            if let Some(id) = self.refs.resolve(&name).await? {
                out.push((name, id));
            }
        }
        Ok(out)
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitpool_refs::{MemoryRefsContainer, RefTarget};
    use gitpool_store::MemoryObjectStore;
    use gitpool_types::ObjectKind;

    fn repo() -> Repository {
        Repository::new(
            "demo",
            Arc::new(MemoryObjectStore::new()),
            Arc::new(MemoryRefsContainer::new()),
        )
    }

    #[tokio::test]
    async fn head_is_none_until_master_exists() {
        let repo = repo();
        assert_eq!(repo.head().await.unwrap(), None);

        let id = ObjectId::hash_object(ObjectKind::Commit, b"tip");
        repo.refs()
            .compare_and_swap(HEAD_REF, None, RefTarget::Id(id))
            .await
            .unwrap();
        assert_eq!(repo.head().await.unwrap(), Some(id));
    }

    #[tokio::test]
    async fn open_index_is_unsupported() {
        assert!(matches!(repo().open_index(), Err(RepoError::NoIndex)));
    }

    #[tokio::test]
    async fn advertised_refs_follow_symbolics_and_skip_dangling() {
        let repo = repo();
        let id = ObjectId::hash_object(ObjectKind::Commit, b"tip");
        repo.refs()
            .compare_and_swap(HEAD_REF, None, RefTarget::Id(id))
            .await
            .unwrap();
        repo.refs().set_symbolic("HEAD", HEAD_REF).await.unwrap();
        repo.refs()
            .set_symbolic("refs/heads/dangling", "refs/heads/nowhere")
            .await
            .unwrap();

        let advertised = repo.advertised_refs().await.unwrap();
        assert_eq!(
            advertised,
            vec![
                ("HEAD".to_string(), id),
                (HEAD_REF.to_string(), id),
            ]
        );
    }
}
