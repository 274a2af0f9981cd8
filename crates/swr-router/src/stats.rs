//! Router counters.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the router. Shared between request handlers and
/// background revalidation tasks.
#[derive(Debug, Default)]
pub struct RouterStats {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    network_fetches: AtomicU64,
    network_failures: AtomicU64,
    synthetic_responses: AtomicU64,
    revalidations: AtomicU64,
    revalidation_failures: AtomicU64,
    passthrough: AtomicU64,
}

/// Point-in-time copy of [`RouterStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub network_fetches: u64,
    pub network_failures: u64,
    pub synthetic_responses: u64,
    pub revalidations: u64,
    pub revalidation_failures: u64,
    pub passthrough: u64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl RouterStats {
    pub(crate) fn record_hit(&self) {
        bump(&self.cache_hits);
    }

    pub(crate) fn record_miss(&self) {
        bump(&self.cache_misses);
    }

    pub(crate) fn record_fetch(&self) {
        bump(&self.network_fetches);
    }

    pub(crate) fn record_network_failure(&self) {
        bump(&self.network_failures);
    }

    pub(crate) fn record_synthetic(&self) {
        bump(&self.synthetic_responses);
    }

    pub(crate) fn record_revalidation(&self, succeeded: bool) {
        bump(&self.revalidations);
        if !succeeded {
            bump(&self.revalidation_failures);
        }
    }

    pub(crate) fn record_passthrough(&self) {
        bump(&self.passthrough);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            network_fetches: self.network_fetches.load(Ordering::Relaxed),
            network_failures: self.network_failures.load(Ordering::Relaxed),
            synthetic_responses: self.synthetic_responses.load(Ordering::Relaxed),
            revalidations: self.revalidations.load(Ordering::Relaxed),
            revalidation_failures: self.revalidation_failures.load(Ordering::Relaxed),
            passthrough: self.passthrough.load(Ordering::Relaxed),
        }
    }
}
