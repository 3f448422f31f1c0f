/// Errors from ref container operations.
///
/// A compare-and-swap mismatch is *not* an error — those surface as a
/// `false` return so callers can re-read and retry.
#[derive(Debug, thiserror::Error)]
pub enum RefError {
    /// The name fails the ref-name grammar.
    #[error("invalid ref name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// A symbolic chain exceeded the hop bound (or cycles).
    #[error("symbolic ref chain too deep starting at {0:?}")]
    DepthExceeded(String),

    /// A stored target cannot be decoded.
    #[error("corrupt ref {name:?}: {reason}")]
    CorruptTarget { name: String, reason: String },

    /// Failure in the database layer.
    #[error("database error: {0}")]
    Db(#[from] gitpool_db::DbError),
}

/// Result alias for ref operations.
pub type RefResult<T> = Result<T, RefError>;
