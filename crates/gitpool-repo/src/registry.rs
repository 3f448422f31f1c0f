use async_trait::async_trait;

use crate::error::{RepoError, RepoResult};
use crate::repository::Repository;

/// Longest name the repo discriminator column accepts.
pub const MAX_REPO_NAME_LEN: usize = 64;

/// Tenant lifecycle: create, open, existence, enumeration, deletion.
///
/// Variants are selected at construction time and passed around as a
/// handle; the dispatcher only ever sees this interface.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Create a new bare repository. Fails with `AlreadyExists` if the
    /// name is taken — re-creation is the caller's concern, checked via
    /// [`Backend::exists`].
    async fn create(&self, name: &str) -> RepoResult<Repository>;

    /// Attach to an existing namespace without creating anything. Must
    /// not fail merely because the namespace is currently empty.
    async fn open(&self, name: &str) -> RepoResult<Repository>;

    /// Whether a repository with that name exists.
    async fn exists(&self, name: &str) -> RepoResult<bool>;

    /// All repository names.
    async fn list(&self) -> RepoResult<Vec<String>>;

    /// Remove every object and ref row for that namespace. Not atomic
    /// across the two deletions; deletion is an administrative,
    /// non-concurrent operation.
    async fn delete(&self, name: &str) -> RepoResult<()>;
}

/// Validate a tenant name before it becomes a discriminator value.
pub fn check_repo_name(name: &str) -> RepoResult<()> {
    let reason = if name.is_empty() {
        Some("must not be empty")
    } else if name.len() > MAX_REPO_NAME_LEN {
        Some("too long")
    } else if name
        .chars()
        .any(|c| c == '/' || c.is_whitespace() || c.is_control())
    {
        Some("must not contain slashes, whitespace, or control characters")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(RepoError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
