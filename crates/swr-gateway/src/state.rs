//! Application state shared across handlers.

use std::sync::Arc;
use swr_router::ServiceWorker;
use url::Url;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub worker: Arc<ServiceWorker>,
    pub upstream: Url,
}

impl AppState {
    pub fn new(worker: Arc<ServiceWorker>, upstream: Url) -> Self {
        Self { worker, upstream }
    }

    /// Map an inbound path and query onto the upstream origin.
    ///
    /// The path is set verbatim rather than resolved, so a path such as
    /// `//other.host/x` stays on the upstream host.
    pub fn upstream_url(&self, path_and_query: &str) -> Url {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (path_and_query, None),
        };
        let mut url = self.upstream.clone();
        url.set_path(path);
        url.set_query(query);
        url.set_fragment(None);
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use swr_core::ports::{CacheStorage, Fetcher};
    use swr_core::{Error, Request, Response, Result};
    use swr_router::{CacheRouter, RouterConfig};

    struct Offline;

    #[async_trait::async_trait]
    impl Fetcher for Offline {
        async fn fetch(&self, request: &Request) -> Result<Response> {
            Err(Error::Network(request.url.to_string()))
        }
    }

    fn state(upstream: &str) -> AppState {
        let upstream = Url::parse(upstream).unwrap();
        let storage = Arc::new(swr_cache::MemoryCacheStorage::new()) as Arc<dyn CacheStorage>;
        let router = CacheRouter::new(
            RouterConfig::new(upstream.clone()),
            storage,
            Arc::new(Offline),
        );
        AppState::new(Arc::new(ServiceWorker::new(router)), upstream)
    }

    #[test]
    fn test_upstream_url_keeps_path_and_query() {
        let state = state("http://127.0.0.1:3000/");
        assert_eq!(
            state.upstream_url("/api/status?x=1").as_str(),
            "http://127.0.0.1:3000/api/status?x=1"
        );
        assert_eq!(state.upstream_url("/").as_str(), "http://127.0.0.1:3000/");
    }

    #[test]
    fn test_upstream_url_never_leaves_upstream_host() {
        let state = state("http://127.0.0.1:3000/");
        for path in ["//evil.example/secret", "//evil.example:80/x?y=1", "/\\evil.example/z"] {
            let url = state.upstream_url(path);
            assert_eq!(url.origin(), state.upstream.origin(), "{}", path);
        }
    }
}
