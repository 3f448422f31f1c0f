use gitpool_types::ObjectId;

use crate::error::RefError;

/// Marker prefix for a stored symbolic indirection.
pub const SYMREF_PREFIX: &[u8] = b"ref: ";

/// What a ref points at: an object directly, or another ref by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefTarget {
    Id(ObjectId),
    Symbolic(String),
}

impl RefTarget {
    /// Stored representation: the 40-hex id, or `"ref: <name>"`.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            RefTarget::Id(id) => id.to_hex().into_bytes(),
            RefTarget::Symbolic(name) => {
                let mut out = SYMREF_PREFIX.to_vec();
                out.extend_from_slice(name.as_bytes());
                out
            }
        }
    }

    /// Decode a stored target value.
    pub fn decode(name: &str, bytes: &[u8]) -> Result<Self, RefError> {
        if let Some(rest) = bytes.strip_prefix(SYMREF_PREFIX) {
            let other = std::str::from_utf8(rest).map_err(|_| RefError::CorruptTarget {
                name: name.to_string(),
                reason: "symbolic target is not UTF-8".into(),
            })?;
            Ok(RefTarget::Symbolic(other.to_string()))
        } else {
            ObjectId::from_any(bytes)
                .map(RefTarget::Id)
                .map_err(|e| RefError::CorruptTarget {
                    name: name.to_string(),
                    reason: e.to_string(),
                })
        }
    }

    /// The object id, when this is a direct target.
    pub fn as_id(&self) -> Option<ObjectId> {
        match self {
            RefTarget::Id(id) => Some(*id),
            RefTarget::Symbolic(_) => None,
        }
    }

    /// Returns `true` for a symbolic indirection.
    pub fn is_symbolic(&self) -> bool {
        matches!(self, RefTarget::Symbolic(_))
    }
}
