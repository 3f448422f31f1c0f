use async_trait::async_trait;

use gitpool_types::ObjectId;

use crate::error::{RefError, RefResult};
use crate::types::RefTarget;

/// Bound on symbolic indirection, matching git's own limit. A chain
/// longer than this — including any cycle — fails rather than looping.
pub const MAX_SYMREF_DEPTH: usize = 5;

/// Per-repository container of named refs.
///
/// Implementations must guarantee at most one row per name and
/// single-winner semantics for guarded updates: of two writers racing a
/// `compare_and_swap` from the same old value, exactly one sees `true`.
#[async_trait]
pub trait RefsContainer: Send + Sync {
    /// All ref names in this repository, sorted. Reissues the underlying
    /// query on each call.
    async fn list_names(&self) -> RefResult<Vec<String>>;

    /// Read the target stored directly under `name`, without following
    /// symbolic indirection.
    async fn read(&self, name: &str) -> RefResult<Option<RefTarget>>;

    /// Guarded update.
    ///
    /// With `expected_old` set, the update lands only if the current
    /// value still matches; a mismatch returns `false`, never an error,
    /// and the caller re-reads and retries. The write goes to the name a
    /// symbolic chain resolves to, which must pass the ref-name grammar.
    async fn compare_and_swap(
        &self,
        name: &str,
        expected_old: Option<&RefTarget>,
        new_target: RefTarget,
    ) -> RefResult<bool>;

    /// Create only: returns `false` without writing if `name` exists.
    async fn add_if_absent(&self, name: &str, target: RefTarget) -> RefResult<bool>;

    /// Guarded removal, the optimistic-check pattern in reverse.
    async fn remove_if_equals(
        &self,
        name: &str,
        expected_old: Option<&RefTarget>,
    ) -> RefResult<bool>;

    /// Point `name` at another ref symbolically.
    async fn set_symbolic(&self, name: &str, other: &str) -> RefResult<()>;

    /// The cached peeled (dereferenced, non-tag) object for a tag ref.
    ///
    /// Consults the in-process cache only — never storage. The cache is a
    /// best-effort local hint: not shared, not persisted, and possibly
    /// empty at any time.
    fn peeled(&self, name: &str) -> Option<ObjectId>;

    /// Record a peeled object in the local cache.
    fn record_peeled(&self, name: &str, id: ObjectId);

    /// Follow symbolic indirection from `name` to a real name and its
    /// stored target, bounded by [`MAX_SYMREF_DEPTH`].
    async fn follow(&self, name: &str) -> RefResult<(String, Option<RefTarget>)> {
        let mut current = name.to_string();
        for _ in 0..=MAX_SYMREF_DEPTH {
            match self.read(&current).await? {
                Some(RefTarget::Symbolic(next)) => current = next,
                other => return Ok((current, other)),
            }
        }
        Err(RefError::DepthExceeded(name.to_string()))
    }

    /// Resolve `name` through any symbolic chain to an object id.
    async fn resolve(&self, name: &str) -> RefResult<Option<ObjectId>> {
        let (_, target) = self.follow(name).await?;
        Ok(target.and_then(|t| t.as_id()))
    }
}
