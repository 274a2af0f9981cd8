//! Test infrastructure for swr.
//!
//! Provides a scripted [`Fetcher`](swr_core::ports::Fetcher) that can be
//! switched offline, storage wrappers that count or fail operations, and
//! helpers that assemble routers and workers around them.
//!
//! # Usage
//!
//! ```ignore
//! use swr_tests::{harness, site_url};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let h = harness();
//!     h.fetcher.respond(&site_url("/"), swr_core::Response::new(200));
//!     // Use h.router, h.storage, h.fetcher ...
//! }
//! ```

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;

/// Initialize test logging (safe to call from every test).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,swr_router=debug")),
        )
        .with_test_writer()
        .try_init();
}
