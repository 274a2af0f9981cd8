//! HTTP gateway hosting the swr cache router.
//!
//! Every inbound request is rewritten to the upstream origin and offered to
//! the worker; requests it does not intercept are forwarded unchanged.

pub mod config;
pub mod fetcher;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{GatewayConfig, StorageConfig};
pub use fetcher::HttpFetcher;
pub use routes::create_router;
pub use server::{build_app, build_worker};
pub use state::AppState;
