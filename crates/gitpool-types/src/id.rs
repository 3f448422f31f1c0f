use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::TypeError;
use crate::object::ObjectKind;

/// Content-addressed identifier for a stored object.
///
/// An `ObjectId` is the SHA-1 of an object's kind, size, and payload —
/// identical content always produces the same id, which is also the
/// object's storage key. The canonical textual form is 40 lowercase hex
/// characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId([u8; 20]);

impl ObjectId {
    /// Compute the id of an object from its kind and payload.
    ///
    /// Hashes the git object envelope `"<kind> <len>\0"` followed by the
    /// payload bytes.
    pub fn hash_object(kind: ObjectKind, payload: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(kind.name().as_bytes());
        hasher.update(b" ");
        hasher.update(payload.len().to_string().as_bytes());
        hasher.update(b"\0");
        hasher.update(payload);
        Self(hasher.finalize().into())
    }

    /// Wrap a pre-computed 20-byte digest.
    pub const fn from_raw(raw: [u8; 20]) -> Self {
        Self(raw)
    }

    /// Parse from a 40-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.len() != 40 {
            return Err(TypeError::InvalidId(s.to_string()));
        }
        let bytes = hex::decode(s).map_err(|_| TypeError::InvalidId(s.to_string()))?;
        let mut raw = [0u8; 20];
        raw.copy_from_slice(&bytes);
        Ok(Self(raw))
    }

    /// Accept an identifier in either supported form: 40 hex characters
    /// or 20 raw digest bytes. Anything else is an invalid identifier.
    pub fn from_any(bytes: &[u8]) -> Result<Self, TypeError> {
        match bytes.len() {
            20 => {
                let mut raw = [0u8; 20];
                raw.copy_from_slice(bytes);
                Ok(Self(raw))
            }
            40 => {
                let s = std::str::from_utf8(bytes)
                    .map_err(|_| TypeError::InvalidId(format!("{bytes:?}")))?;
                Self::from_hex(s)
            }
            _ => Err(TypeError::InvalidId(format!("{} bytes", bytes.len()))),
        }
    }

    /// The all-zero id, used on the wire to mean "no object".
    pub const fn zero() -> Self {
        Self([0u8; 20])
    }

    /// Returns `true` if this is the all-zero id.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// The raw 20-byte digest.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 20]> for ObjectId {
    fn from(raw: [u8; 20]) -> Self {
        Self(raw)
    }
}

impl From<ObjectId> for [u8; 20] {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}
