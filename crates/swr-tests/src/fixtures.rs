//! Test doubles for the router's ports.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use swr_cache::MemoryCacheStorage;
use swr_core::ports::{CacheStorage, Fetcher};
use swr_core::{Error, Request, Response, Result};

/// Fetcher answering from a fixed URL table. Unknown URLs get a 404; when
/// offline every fetch fails with a network error. Each fetch yields once so
/// concurrent callers interleave the way real network I/O would.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    routes: Mutex<HashMap<String, Response>>,
    offline: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `response` for `url` from now on.
    pub fn respond(&self, url: &str, response: Response) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
        self
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Every URL fetched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        let url = request.url.to_string();
        self.calls.lock().unwrap().push(url.clone());
        tokio::task::yield_now().await;

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("offline: {}", url)));
        }

        let response = self.routes.lock().unwrap().get(&url).cloned();
        Ok(response.unwrap_or_else(|| Response::new(404)))
    }
}

/// Wraps a real fetcher with an offline switch.
pub struct SwitchableFetcher {
    inner: Arc<dyn Fetcher>,
    offline: AtomicBool,
}

impl SwitchableFetcher {
    pub fn new(inner: Arc<dyn Fetcher>) -> Self {
        Self {
            inner,
            offline: AtomicBool::new(false),
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl Fetcher for SwitchableFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("offline: {}", request.url)));
        }
        self.inner.fetch(request).await
    }
}

/// In-memory storage that counts every operation.
#[derive(Debug, Default)]
pub struct CountingStorage {
    pub inner: MemoryCacheStorage,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl CountingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStorage for CountingStorage {
    async fn open(&self, partition: &str) -> Result<()> {
        self.inner.open(partition).await
    }

    async fn match_url(&self, partition: &str, url: &str) -> Result<Option<Response>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.match_url(partition, url).await
    }

    async fn put(&self, partition: &str, url: &str, response: &Response) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.put(partition, url, response).await
    }

    async fn partitions(&self) -> Result<Vec<String>> {
        self.inner.partitions().await
    }

    async fn delete_partition(&self, partition: &str) -> Result<bool> {
        self.inner.delete_partition(partition).await
    }
}

/// Storage where every operation fails, as when cache storage is unavailable.
#[derive(Debug, Default)]
pub struct UnavailableStorage;

fn unavailable() -> Error {
    Error::CacheUnavailable("storage disabled".to_string())
}

#[async_trait]
impl CacheStorage for UnavailableStorage {
    async fn open(&self, _partition: &str) -> Result<()> {
        Err(unavailable())
    }

    async fn match_url(&self, _partition: &str, _url: &str) -> Result<Option<Response>> {
        Err(unavailable())
    }

    async fn put(&self, _partition: &str, _url: &str, _response: &Response) -> Result<()> {
        Err(unavailable())
    }

    async fn partitions(&self) -> Result<Vec<String>> {
        Err(unavailable())
    }

    async fn delete_partition(&self, _partition: &str) -> Result<bool> {
        Err(unavailable())
    }
}

/// Canned responses.
pub struct ResponseFixture;

impl ResponseFixture {
    pub fn html(body: &str) -> Response {
        Response::new(200)
            .with_header("content-type", "text/html")
            .with_body(body.as_bytes())
    }

    pub fn javascript(body: &str) -> Response {
        Response::new(200)
            .with_header("content-type", "application/javascript")
            .with_body(body.as_bytes())
    }

    pub fn json(body: &str) -> Response {
        Response::new(200)
            .with_header("content-type", "application/json")
            .with_body(body.as_bytes())
    }

    pub fn png() -> Response {
        Response::new(200)
            .with_header("content-type", "image/png")
            .with_body(vec![0x89, b'P', b'N', b'G'])
    }

    pub fn server_error() -> Response {
        Response::new(500).with_body("upstream exploded")
    }
}
