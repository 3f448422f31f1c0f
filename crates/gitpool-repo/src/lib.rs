//! Repositories and the tenant registry.
//!
//! A [`Repository`] is a handle onto one tenant's namespace: its object
//! store and its ref container, always bare. A [`Backend`] manages tenant
//! lifecycle — create, open, existence, enumeration, deletion — with the
//! storage variant chosen at construction time: [`PgBackend`] for the
//! shared database, [`MemoryBackend`] for tests and embedding.

pub mod error;
pub mod memory;
pub mod pg;
pub mod registry;
pub mod repository;
pub mod walk;

pub use error::{RepoError, RepoResult};
pub use memory::MemoryBackend;
pub use pg::PgBackend;
pub use registry::Backend;
pub use repository::Repository;
pub use walk::{closure, referenced_ids};
