use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use gitpool_repo::Backend;

use crate::handler;

/// State every handler sees: the tenant backend and the body-size cap.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub max_request_bytes: u64,
}

/// Build the axum router with all gitpool endpoints.
///
/// Exactly three protocol routes exist; anything else falls through to
/// the router's default 404.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/info", get(handler::info_handler))
        .route("/:repo/info/refs", get(handler::info_refs_handler))
        .route("/:repo/:service", post(handler::service_post_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
