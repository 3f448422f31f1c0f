//! Tenant-scoped content-addressable object storage.
//!
//! Each repository owns a disjoint namespace of immutable objects keyed by
//! content hash. Writes are idempotent upserts: a duplicate id is a no-op,
//! never an error and never an overwrite, which makes concurrent writers
//! commutative.
//!
//! # Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`PgObjectStore`] -- rows in the shared postgres database,
//!   discriminated by repository name, payloads zlib-compressed at rest.
//! - [`MemoryObjectStore`] -- `HashMap`-based store for tests and
//!   embedding.
//!
//! The thin-pack completion path lives in [`thin`]: it turns an incoming
//! transfer stream that references objects outside itself into a
//! self-contained, checksummed pack, then commits the whole batch at once.

pub mod error;
pub mod memory;
pub mod pg;
pub mod thin;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryObjectStore;
pub use pg::PgObjectStore;
pub use thin::{add_pack, add_thin_pack, complete_thin_pack};
pub use traits::ObjectStore;
