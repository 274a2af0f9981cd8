//! Builders for routers and workers wired to test doubles.

use crate::fixtures::{CountingStorage, ScriptedFetcher};
use std::sync::Arc;
use std::time::Duration;
use swr_core::ports::{CacheStorage, Fetcher};
use swr_core::{Method, Request};
use swr_router::{CacheRouter, RouterConfig, ServiceWorker};
use url::Url;

/// Origin every test router is scoped to.
pub const ORIGIN: &str = "https://app.example.com";

/// Absolute URL on the test origin.
pub fn site_url(path: &str) -> String {
    format!("{}{}", ORIGIN, path)
}

pub fn get(path: &str) -> Request {
    request(Method::Get, &site_url(path))
}

pub fn request(method: Method, url: &str) -> Request {
    Request::new(method, Url::parse(url).expect("test URL is valid"))
}

pub fn test_config() -> RouterConfig {
    RouterConfig::for_scope(&site_url("/")).expect("test scope is valid")
}

/// A router plus handles to its doubles.
pub struct Harness {
    pub router: CacheRouter,
    pub storage: Arc<CountingStorage>,
    pub fetcher: Arc<ScriptedFetcher>,
}

impl Harness {
    pub fn config(&self) -> &RouterConfig {
        self.router.config()
    }

    /// Wrap the router in a worker (not yet installed).
    pub fn worker(&self) -> ServiceWorker {
        ServiceWorker::new(self.router.clone())
    }
}

pub fn harness() -> Harness {
    harness_with(test_config())
}

pub fn harness_with(config: RouterConfig) -> Harness {
    let storage = Arc::new(CountingStorage::new());
    let fetcher = Arc::new(ScriptedFetcher::new());
    let router = CacheRouter::new(
        config,
        Arc::clone(&storage) as Arc<dyn CacheStorage>,
        Arc::clone(&fetcher) as Arc<dyn Fetcher>,
    );
    Harness {
        router,
        storage,
        fetcher,
    }
}

/// Poll `condition` until it holds or `timeout` elapses.
pub async fn wait_for(condition: impl Fn() -> bool, timeout: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
