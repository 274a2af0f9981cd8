//! Port traits.
//!
//! These traits define the interfaces between the router and the adapters
//! that talk to the network and to persistent cache storage.

use crate::http::{Request, Response};
use crate::Result;
use async_trait::async_trait;

/// Network access.
///
/// `Err` means the request never produced a response (offline, DNS failure,
/// connection reset). HTTP error statuses are returned as `Ok` responses.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response>;
}

/// Named cache partitions holding URL to response snapshots.
///
/// Each operation is atomic on its own; nothing coordinates across calls.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open (creating if absent) a partition.
    async fn open(&self, partition: &str) -> Result<()>;

    /// Look up the entry for a URL.
    async fn match_url(&self, partition: &str, url: &str) -> Result<Option<Response>>;

    /// Insert or overwrite the entry for a URL.
    async fn put(&self, partition: &str, url: &str, response: &Response) -> Result<()>;

    /// Names of all existing partitions.
    async fn partitions(&self) -> Result<Vec<String>>;

    /// Delete a partition and all its entries. Returns false if it did not exist.
    async fn delete_partition(&self, partition: &str) -> Result<bool>;
}
