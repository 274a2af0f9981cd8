//! Worker lifecycle: install, activate and control messages.

use crate::messages::{ControlMessage, MessageOutcome};
use crate::router::{CacheRouter, FetchDecision};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use swr_core::{Error, Method, Request, Response, Result};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use url::Url;

/// Worker lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
}

/// Outcome of [`ServiceWorker::install`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub cached: Vec<String>,
    pub failed: Vec<String>,
}

/// Outcome of [`ServiceWorker::activate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivateReport {
    pub deleted: Vec<String>,
}

/// A cache router plus the lifecycle of the worker that hosts it.
pub struct ServiceWorker {
    router: CacheRouter,
    state_tx: watch::Sender<WorkerState>,
    skip_waiting: AtomicBool,
    controlling: AtomicBool,
}

impl ServiceWorker {
    pub fn new(router: CacheRouter) -> Self {
        let (state_tx, _) = watch::channel(WorkerState::Parsed);
        Self {
            router,
            state_tx,
            skip_waiting: AtomicBool::new(false),
            controlling: AtomicBool::new(false),
        }
    }

    pub fn router(&self) -> &CacheRouter {
        &self.router
    }

    pub fn state(&self) -> WorkerState {
        *self.state_tx.borrow()
    }

    /// Watch lifecycle transitions.
    pub fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.state_tx.subscribe()
    }

    /// Whether the worker has claimed its clients and intercepts fetches.
    pub fn is_controlling(&self) -> bool {
        self.controlling.load(Ordering::SeqCst)
    }

    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    fn transition(&self, state: WorkerState) {
        debug!(from = ?self.state(), to = ?state, "Worker state change");
        self.state_tx.send_replace(state);
    }

    /// Precache the static manifest. Individual failures are logged and
    /// reported; they never abort installation.
    pub async fn install(&self) -> InstallReport {
        self.transition(WorkerState::Installing);
        let partition = self.router.config().partitions.static_assets.clone();
        info!(partition = %partition, "Installing worker");

        if let Err(e) = self.router.storage().open(&partition).await {
            error!(partition = %partition, error = %e, "Failed to open static partition");
        }

        let report = match self.router.config().precache_urls() {
            Ok(urls) => self.add_all(&partition, urls).await,
            Err(e) => {
                error!(error = %e, "Invalid precache manifest");
                InstallReport {
                    cached: vec![],
                    failed: self.router.config().precache.clone(),
                }
            }
        };

        if !report.failed.is_empty() {
            warn!(failed = ?report.failed, "Some precache assets could not be cached");
        }

        self.transition(WorkerState::Installed);
        self.skip_waiting();
        info!(cached = report.cached.len(), "Worker installed");
        report
    }

    /// Delete partitions outside the recognized set, then claim clients.
    pub async fn activate(&self) -> ActivateReport {
        self.transition(WorkerState::Activating);
        let partitions = &self.router.config().partitions;
        let mut report = ActivateReport::default();

        match self.router.storage().partitions().await {
            Ok(existing) => {
                for name in existing {
                    if partitions.is_recognized(&name) {
                        continue;
                    }
                    match self.router.storage().delete_partition(&name).await {
                        Ok(true) => {
                            info!(partition = %name, "Deleted stale cache partition");
                            report.deleted.push(name);
                        }
                        Ok(false) => {}
                        Err(e) => {
                            error!(partition = %name, error = %e, "Failed to delete partition")
                        }
                    }
                }
            }
            Err(e) => error!(error = %e, "Failed to enumerate cache partitions"),
        }

        self.transition(WorkerState::Activated);
        self.claim();
        info!(deleted = report.deleted.len(), "Worker activated");
        report
    }

    /// Ask to activate without waiting for older workers to finish.
    pub fn skip_waiting(&self) {
        self.skip_waiting.store(true, Ordering::SeqCst);
    }

    /// Take control of already open clients.
    pub fn claim(&self) {
        self.controlling.store(true, Ordering::SeqCst);
    }

    /// Handle a fetch. Until the worker controls its clients every request
    /// passes through.
    pub async fn handle_fetch(&self, request: &Request) -> FetchDecision {
        if !self.is_controlling() {
            self.router.stats().record_passthrough();
            return FetchDecision::Passthrough;
        }
        self.router.handle(request).await
    }

    /// Handle a control message from the hosting page.
    pub async fn handle_message(&self, message: ControlMessage) -> MessageOutcome {
        debug!(message_type = message.kind(), "Control message received");
        match message {
            ControlMessage::SkipWaiting => {
                self.skip_waiting();
                let activated = if self.state() == WorkerState::Installed {
                    self.activate().await;
                    true
                } else {
                    false
                };
                MessageOutcome::SkippedWaiting { activated }
            }
            ControlMessage::CacheUrls(urls) => self.cache_urls(&urls).await,
            ControlMessage::ClearCache => MessageOutcome::Cleared {
                deleted: self.clear_all().await,
            },
            ControlMessage::Unknown(kind) => {
                warn!(message_type = %kind, "Unknown control message ignored");
                MessageOutcome::Ignored { message_type: kind }
            }
        }
    }

    async fn cache_urls(&self, urls: &[String]) -> MessageOutcome {
        let partition = self.router.config().partitions.dynamic.clone();
        let mut resolved = Vec::with_capacity(urls.len());
        let mut failed = vec![];

        for url in urls {
            match self.router.config().resolve(url) {
                Ok(parsed) => resolved.push(parsed),
                Err(e) => {
                    warn!(url = %url, error = %e, "Skipping invalid URL");
                    failed.push(url.clone());
                }
            }
        }

        let mut report = self.add_all(&partition, resolved).await;
        failed.append(&mut report.failed);
        info!(cached = report.cached.len(), failed = failed.len(), "Cached requested URLs");
        MessageOutcome::Cached {
            cached: report.cached,
            failed,
        }
    }

    /// Delete every partition, recognized or not.
    async fn clear_all(&self) -> Vec<String> {
        let storage = self.router.storage();
        let names = match storage.partitions().await {
            Ok(names) => names,
            Err(e) => {
                error!(error = %e, "Failed to enumerate cache partitions");
                return vec![];
            }
        };

        let mut deleted = vec![];
        for name in names {
            match storage.delete_partition(&name).await {
                Ok(true) => deleted.push(name),
                Ok(false) => {}
                Err(e) => error!(partition = %name, error = %e, "Failed to delete partition"),
            }
        }
        info!(deleted = ?deleted, "All caches cleared");
        deleted
    }

    /// Fetch each URL and store successful responses. Best effort per URL.
    async fn add_all(&self, partition: &str, urls: Vec<Url>) -> InstallReport {
        let mut report = InstallReport::default();
        for url in urls {
            match self.fetch_ok(&url).await {
                Ok(response) => {
                    self.router.store(partition, url.as_str(), &response).await;
                    report.cached.push(url.to_string());
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Failed to cache URL");
                    report.failed.push(url.to_string());
                }
            }
        }
        report
    }

    async fn fetch_ok(&self, url: &Url) -> Result<Response> {
        let request = Request::new(Method::Get, url.clone());
        let response = self.router.fetch(&request).await?;
        if !response.is_ok() {
            return Err(Error::Other(format!(
                "{} returned status {}",
                url, response.status
            )));
        }
        Ok(response)
    }
}
