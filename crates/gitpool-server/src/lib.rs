//! Smart-HTTP server for gitpool.
//!
//! Dispatches inbound requests onto the three protocol operations: ref
//! advertisement (`GET /<repo>/info/refs`), receive (`POST
//! /<repo>/git-receive-pack`), and upload (`POST
//! /<repo>/git-upload-pack`). The addressed repository comes from the
//! path prefix; the tenant backend and the request body cap are the only
//! shared state.

pub mod body;
pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use router::{build_router, AppState};
pub use server::GitpoolServer;
