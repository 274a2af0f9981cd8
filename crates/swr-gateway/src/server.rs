//! Wiring: storage, fetcher, worker and the HTTP server.

use axum::Router;
use std::sync::Arc;
use swr_cache::{FilesystemCacheStorage, MemoryCacheStorage};
use swr_core::ports::{CacheStorage, Fetcher};
use swr_router::{CacheRouter, ServiceWorker};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::{GatewayConfig, StorageConfig};
use crate::fetcher::HttpFetcher;
use crate::routes::create_router;
use crate::state::AppState;

fn build_storage(config: &StorageConfig) -> Arc<dyn CacheStorage> {
    match config {
        StorageConfig::Memory => Arc::new(MemoryCacheStorage::new()),
        StorageConfig::Filesystem { dir } => Arc::new(FilesystemCacheStorage::new(dir.clone())),
    }
}

/// Build a worker over the given adapters and run install + activate.
pub async fn build_worker(
    config: &GatewayConfig,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn Fetcher>,
) -> Arc<ServiceWorker> {
    let router = CacheRouter::new(config.router_config(), storage, fetcher);
    let worker = ServiceWorker::new(router);

    let installed = worker.install().await;
    let activated = worker.activate().await;
    info!(
        precached = installed.cached.len(),
        precache_failed = installed.failed.len(),
        stale_partitions_deleted = activated.deleted.len(),
        "Worker ready"
    );

    Arc::new(worker)
}

/// Build the application from configuration.
pub async fn build_app(config: &GatewayConfig) -> swr_core::Result<Router> {
    let storage = build_storage(&config.storage);
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(config.request_timeout())?);
    let worker = build_worker(config, storage, fetcher).await;
    let state = Arc::new(AppState::new(worker, config.upstream.clone()));
    Ok(create_router(state))
}

/// Serve until Ctrl-C.
pub async fn serve(config: GatewayConfig) -> anyhow::Result<()> {
    let app = build_app(&config).await?;
    let listener = TcpListener::bind(config.listen).await?;

    info!(
        listen = %listener.local_addr()?,
        upstream = %config.upstream,
        "Gateway listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
