use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::ObjectId;

/// The four object kinds, stored as small integers.
///
/// The numeric tags are git's own type numbers, which the pack format and
/// the objects table both use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ObjectKind {
    Commit = 1,
    Tree = 2,
    Blob = 3,
    Tag = 4,
}

impl ObjectKind {
    /// Decode from the stored numeric tag.
    pub fn from_num(num: u8) -> Result<Self, TypeError> {
        match num {
            1 => Ok(Self::Commit),
            2 => Ok(Self::Tree),
            3 => Ok(Self::Blob),
            4 => Ok(Self::Tag),
            other => Err(TypeError::UnknownKind(other)),
        }
    }

    /// The stored numeric tag.
    pub fn as_num(self) -> u8 {
        self as u8
    }

    /// The textual name used in the object id envelope.
    pub fn name(self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Tree => "tree",
            Self::Blob => "blob",
            Self::Tag => "tag",
        }
    }

    /// Decode from the textual name.
    pub fn from_name(name: &str) -> Result<Self, TypeError> {
        match name {
            "commit" => Ok(Self::Commit),
            "tree" => Ok(Self::Tree),
            "blob" => Ok(Self::Blob),
            "tag" => Ok(Self::Tag),
            other => Err(TypeError::UnknownKindName(other.to_string())),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An immutable content object: a kind tag and an opaque payload.
///
/// The store never interprets the payload; parsing commits and trees is
/// the concern of whoever walks the graph.
#[derive(Clone, PartialEq, Eq)]
pub struct RawObject {
    pub kind: ObjectKind,
    pub payload: Bytes,
}

impl RawObject {
    pub fn new(kind: ObjectKind, payload: impl Into<Bytes>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    /// The content-addressed id of this object.
    pub fn id(&self) -> ObjectId {
        ObjectId::hash_object(self.kind, &self.payload)
    }

    /// Uncompressed payload length.
    pub fn size(&self) -> u64 {
        self.payload.len() as u64
    }
}

impl fmt::Debug for RawObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawObject")
            .field("kind", &self.kind)
            .field("size", &self.payload.len())
            .field("id", &self.id())
            .finish()
    }
}
