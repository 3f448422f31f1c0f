//! Named references for gitpool repositories.
//!
//! A ref is a mutable pointer from a path-like name to either an object id
//! or, symbolically, to another ref. Updates are optimistic: a writer
//! states the value it believes is current and the update only lands if
//! that is still true, so concurrent writers to one ref have exactly one
//! winner.
//!
//! # Backends
//!
//! - [`PgRefsContainer`] -- rows in the shared postgres database,
//!   discriminated by repository name.
//! - [`MemoryRefsContainer`] -- `HashMap`-based container for tests.

pub mod error;
pub mod memory;
pub mod names;
pub mod pg;
pub mod traits;
pub mod types;

pub use error::{RefError, RefResult};
pub use memory::MemoryRefsContainer;
pub use names::check_ref_name;
pub use pg::PgRefsContainer;
pub use traits::{RefsContainer, MAX_SYMREF_DEPTH};
pub use types::RefTarget;

/// The repository's default head pointer.
pub const HEAD_REF: &str = "refs/heads/master";
