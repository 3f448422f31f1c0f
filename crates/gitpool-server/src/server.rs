use std::sync::Arc;

use tokio::net::TcpListener;

use gitpool_repo::Backend;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::{build_router, AppState};

/// gitpool repository server.
pub struct GitpoolServer {
    config: ServerConfig,
    backend: Arc<dyn Backend>,
}

impl GitpoolServer {
    pub fn new(config: ServerConfig, backend: Arc<dyn Backend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState {
            backend: self.backend.clone(),
            max_request_bytes: self.config.max_request_bytes,
        })
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("gitpool server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
