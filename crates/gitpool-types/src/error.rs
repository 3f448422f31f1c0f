/// Errors from parsing or constructing core types.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// The supplied identifier is neither 40 hex characters nor 20 raw bytes.
    #[error("invalid object id: {0}")]
    InvalidId(String),

    /// Unknown numeric object kind tag.
    #[error("unknown object kind: {0}")]
    UnknownKind(u8),

    /// Unknown textual object kind name.
    #[error("unknown object kind name: {0:?}")]
    UnknownKindName(String),
}
