use gitpool_types::ObjectId;

/// Errors from pack encoding and decoding.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// The stream ended before a complete structure could be read.
    #[error("truncated pack stream")]
    Truncated,

    /// The stream does not start with the pack magic.
    #[error("bad pack magic: {0:?}")]
    BadMagic([u8; 4]),

    /// Unsupported pack format version.
    #[error("unsupported pack version: {0}")]
    UnsupportedVersion(u32),

    /// The trailing checksum does not match the stream body.
    #[error("pack checksum mismatch")]
    ChecksumMismatch,

    /// An entry could not be decoded.
    #[error("corrupt pack entry at offset {offset}: {reason}")]
    CorruptEntry { offset: usize, reason: String },

    /// Unknown entry type tag.
    #[error("unknown pack entry type: {0}")]
    UnknownType(u8),

    /// A delta's base object is not available.
    #[error("missing delta base: {0}")]
    MissingBase(ObjectId),

    /// A delta instruction stream is malformed.
    #[error("bad delta: {0}")]
    BadDelta(String),

    /// I/O failure from the compression layer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for pack operations.
pub type PackResult<T> = Result<T, PackError>;
