//! Core types shared across the gitpool crates.
//!
//! Every piece of content in a gitpool repository is an immutable object
//! identified by the SHA-1 of its kind, size, and payload — the same id
//! function git itself uses. This crate defines that identifier, the four
//! object kinds, and the raw object value the stores traffic in.

pub mod error;
pub mod id;
pub mod object;

pub use error::TypeError;
pub use id::ObjectId;
pub use object::{ObjectKind, RawObject};
