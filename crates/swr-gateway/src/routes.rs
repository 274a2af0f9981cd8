//! Route definitions.

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::{control, health, proxy};
use crate::middleware;
use crate::state::AppState;

/// Create the gateway router. Anything not matched by an admin route is
/// proxied through the worker.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/__swr", admin_routes())
        .route("/health", get(health::health))
        .fallback(proxy::proxy)
        .layer(axum::middleware::from_fn(middleware::request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats", get(control::stats))
        .route("/message", post(control::message))
}
