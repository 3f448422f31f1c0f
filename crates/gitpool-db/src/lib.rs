//! Database access for gitpool.
//!
//! All persistent state lives in one postgres database shared by every
//! repository. This crate owns the only path to it: a bounded connection
//! pool handing out scoped, read-committed transactions with bounded
//! retry on transient failures.
//!
//! # Design Rules
//!
//! 1. One scoped operation is one acquire, one commit-or-rollback, one
//!    release. Nothing holds a connection across await points outside
//!    [`Db::with_conn`].
//! 2. Scoped operations are self-contained, which is what makes retrying
//!    them whole safe.
//! 3. The pool is an explicit handle constructed once at startup and
//!    passed to every component that needs it; there is no global.

pub mod config;
pub mod error;
pub mod pool;

pub use config::DbConfig;
pub use error::{DbError, DbResult};
pub use pool::Db;
