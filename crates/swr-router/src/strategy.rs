//! Caching strategies.

use crate::router::CacheRouter;
use serde::Serialize;
use swr_core::http::PAGE_OFFLINE_BODY;
use swr_core::{Method, Request, Response};
use tracing::{debug, warn};

/// Caching strategy applied to a route kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Serve the cached copy and refresh it in the background.
    StaleWhileRevalidate,
    /// Prefer the network, fall back to the cached copy.
    NetworkFirst,
    /// Serve the cached copy, fetch only on a miss.
    CacheFirst,
    /// Prefer the network, then the cached page, then the cached root document.
    NetworkFirstWithFallback,
}

impl CacheRouter {
    /// Static assets.
    pub(crate) async fn stale_while_revalidate(&self, request: &Request) -> Response {
        let partition = &self.config.partitions.static_assets;
        let url = request.cache_key();

        if let Some(cached) = self.lookup(partition, url).await {
            self.stats.record_hit();
            self.spawn_revalidation(request.clone());
            return cached;
        }
        self.stats.record_miss();

        match self.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.store(partition, url, &response).await;
                }
                response
            }
            Err(e) => {
                warn!(url, error = %e, "Static asset unavailable");
                self.synthetic(Response::not_found())
            }
        }
    }

    /// Detached refresh of a static asset. Nothing awaits the task; its
    /// outcome only reaches the log and the stats.
    fn spawn_revalidation(&self, request: Request) {
        let router = self.clone();
        tokio::spawn(async move {
            let url = request.cache_key();
            let succeeded = match router.fetch(&request).await {
                Ok(response) if response.is_ok() => {
                    router
                        .store(&router.config.partitions.static_assets, url, &response)
                        .await;
                    debug!(url, "Revalidated static asset");
                    true
                }
                Ok(response) => {
                    debug!(url, status = response.status, "Revalidation kept stale copy");
                    true
                }
                Err(e) => {
                    warn!(url, error = %e, "Background revalidation failed");
                    false
                }
            };
            router.stats.record_revalidation(succeeded);
        });
    }

    /// API calls.
    pub(crate) async fn network_first(&self, request: &Request) -> Response {
        let partition = &self.config.partitions.dynamic;
        let url = request.cache_key();

        match self.fetch(request).await {
            Ok(response) => {
                if request.method == Method::Get && response.is_ok() {
                    self.store(partition, url, &response).await;
                }
                response
            }
            Err(e) => {
                if let Some(cached) = self.lookup(partition, url).await {
                    self.stats.record_hit();
                    debug!(url, error = %e, "Network failed, serving cached API response");
                    return cached;
                }
                self.stats.record_miss();
                warn!(url, error = %e, "API unavailable and not cached");
                self.synthetic(Response::service_unavailable())
            }
        }
    }

    /// Images.
    pub(crate) async fn cache_first(&self, request: &Request) -> Response {
        let partition = &self.config.partitions.dynamic;
        let url = request.cache_key();

        if let Some(cached) = self.lookup(partition, url).await {
            self.stats.record_hit();
            return cached;
        }
        self.stats.record_miss();

        match self.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.store(partition, url, &response).await;
                }
                response
            }
            Err(e) => {
                debug!(url, error = %e, "Image unavailable");
                self.synthetic(Response::not_found())
            }
        }
    }

    /// Pages and anything unclassified.
    pub(crate) async fn network_first_with_fallback(&self, request: &Request) -> Response {
        let partitions = &self.config.partitions;
        let url = request.cache_key();

        let error = match self.fetch(request).await {
            Ok(response) => {
                if response.is_ok() {
                    self.store(&partitions.dynamic, url, &response).await;
                }
                return response;
            }
            Err(e) => e,
        };

        if let Some(cached) = self.lookup(&partitions.dynamic, url).await {
            self.stats.record_hit();
            debug!(url, error = %error, "Serving cached page");
            return cached;
        }

        match self.config.root_document_url() {
            Ok(root) => {
                if let Some(shell) = self.lookup(&partitions.static_assets, root.as_str()).await {
                    self.stats.record_hit();
                    debug!(url, root = %root, "Serving cached root document");
                    return shell;
                }
            }
            Err(e) => warn!(error = %e, "Cannot resolve root document"),
        }

        self.stats.record_miss();
        warn!(url, error = %error, "Page not available offline");
        self.synthetic(Response::not_found_text(PAGE_OFFLINE_BODY))
    }
}
