use gitpool_types::ObjectId;

/// Errors from repository and registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// No repository with that name.
    #[error("repository not found: {0}")]
    NotFound(String),

    /// A repository with that name already exists.
    #[error("repository already exists: {0}")]
    AlreadyExists(String),

    /// Unusable repository name.
    #[error("invalid repository name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// Bare repositories have no working-tree index.
    #[error("bare repository has no index")]
    NoIndex,

    /// An object's payload cannot be parsed for graph walking.
    #[error("malformed {kind} object {id}: {reason}")]
    MalformedObject {
        id: ObjectId,
        kind: &'static str,
        reason: String,
    },

    /// Failure in the object store.
    #[error("store error: {0}")]
    Store(#[from] gitpool_store::StoreError),

    /// Failure in the ref container.
    #[error("ref error: {0}")]
    Refs(#[from] gitpool_refs::RefError),

    /// Failure in the database layer.
    #[error("database error: {0}")]
    Db(#[from] gitpool_db::DbError),
}

/// Result alias for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;
