//! Offline cache router.
//!
//! Classifies intercepted GET requests by URL, applies a caching strategy per
//! route kind over named cache partitions, and hosts the install / activate
//! lifecycle and control messages of the worker that owns the router.

pub mod classify;
pub mod config;
pub mod lifecycle;
pub mod messages;
pub mod router;
pub mod stats;
mod strategy;

pub use classify::{RouteKind, classify};
pub use config::{PartitionNames, RouterConfig};
pub use lifecycle::{ActivateReport, InstallReport, ServiceWorker, WorkerState};
pub use messages::{ControlMessage, MessageOutcome};
pub use router::{CacheRouter, FetchDecision};
pub use stats::{RouterStats, StatsSnapshot};
pub use strategy::Strategy;
