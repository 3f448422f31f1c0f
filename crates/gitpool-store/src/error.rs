use gitpool_types::{ObjectId, TypeError};

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object is not in this repository's namespace.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// A malformed identifier was rejected before any I/O.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] TypeError),

    /// A stored row cannot be decoded back into an object.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: ObjectId, reason: String },

    /// Failure in the database layer.
    #[error("database error: {0}")]
    Db(#[from] gitpool_db::DbError),

    /// Failure decoding or completing a pack stream.
    #[error("pack error: {0}")]
    Pack(#[from] gitpool_pack::PackError),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
