//! The cache router.

use crate::classify::{RouteKind, classify_url};
use crate::config::RouterConfig;
use crate::stats::RouterStats;
use crate::strategy::Strategy;
use std::sync::Arc;
use swr_core::ports::{CacheStorage, Fetcher};
use swr_core::{Method, Request, Response, Result};
use tracing::{debug, warn};

/// What the router did with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchDecision {
    /// Not intercepted; the caller should send the request to the network as is.
    Passthrough,
    /// Intercepted and answered from cache, network or a synthetic fallback.
    Respond(Response),
}

impl FetchDecision {
    pub fn into_response(self) -> Option<Response> {
        match self {
            Self::Passthrough => None,
            Self::Respond(response) => Some(response),
        }
    }
}

/// Routes intercepted requests through the per-kind caching strategies.
///
/// Stateless per request; the only shared state is the cache storage.
/// Cloning is cheap and clones share storage, fetcher and stats.
#[derive(Clone)]
pub struct CacheRouter {
    pub(crate) config: Arc<RouterConfig>,
    pub(crate) storage: Arc<dyn CacheStorage>,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) stats: Arc<RouterStats>,
}

impl CacheRouter {
    pub fn new(
        config: RouterConfig,
        storage: Arc<dyn CacheStorage>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            fetcher,
            stats: Arc::new(RouterStats::default()),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    pub fn fetcher(&self) -> &Arc<dyn Fetcher> {
        &self.fetcher
    }

    pub fn stats(&self) -> &Arc<RouterStats> {
        &self.stats
    }

    /// Whether the router handles this request at all.
    ///
    /// Only GET is intercepted. Cross-origin requests are left alone unless
    /// their path sits under the configured base path.
    pub fn intercepts(&self, request: &Request) -> bool {
        if request.method != Method::Get {
            return false;
        }
        if self.config.is_same_origin(&request.url) {
            return true;
        }
        !self.config.base_path.is_empty() && request.path().starts_with(&self.config.base_path)
    }

    /// Handle an intercepted request.
    pub async fn handle(&self, request: &Request) -> FetchDecision {
        if !self.intercepts(request) {
            self.stats.record_passthrough();
            debug!(method = %request.method, url = %request.url, "Passing request through");
            return FetchDecision::Passthrough;
        }

        let kind = classify_url(&request.url);
        debug!(url = %request.url, kind = %kind, "Routing request");
        FetchDecision::Respond(self.route(request, kind).await)
    }

    /// Apply the strategy for an already classified request.
    pub async fn route(&self, request: &Request, kind: RouteKind) -> Response {
        match kind.strategy() {
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request).await,
            Strategy::NetworkFirst => self.network_first(request).await,
            Strategy::CacheFirst => self.cache_first(request).await,
            Strategy::NetworkFirstWithFallback => self.network_first_with_fallback(request).await,
        }
    }

    /// Cache lookup where storage errors count as a miss.
    pub(crate) async fn lookup(&self, partition: &str, url: &str) -> Option<Response> {
        match self.storage.match_url(partition, url).await {
            Ok(found) => found,
            Err(e) => {
                warn!(partition, url, error = %e, "Cache lookup failed");
                None
            }
        }
    }

    /// Cache write where failures are logged and dropped.
    pub(crate) async fn store(&self, partition: &str, url: &str, response: &Response) {
        if let Err(e) = self.storage.put(partition, url, response).await {
            warn!(partition, url, error = %e, "Cache write failed");
        }
    }

    pub(crate) async fn fetch(&self, request: &Request) -> Result<Response> {
        self.stats.record_fetch();
        let result = self.fetcher.fetch(request).await;
        if let Err(e) = &result {
            self.stats.record_network_failure();
            debug!(url = %request.url, error = %e, "Network fetch failed");
        }
        result
    }

    pub(crate) fn synthetic(&self, response: Response) -> Response {
        self.stats.record_synthetic();
        response
    }
}
