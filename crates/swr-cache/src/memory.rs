//! In-memory cache storage.

use async_trait::async_trait;
use std::collections::HashMap;
use swr_core::ports::CacheStorage;
use swr_core::{Response, ResponseSource, Result};
use tokio::sync::RwLock;

type Partition = HashMap<String, Response>;

/// Cache partitions held in process memory. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    partitions: RwLock<HashMap<String, Partition>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in a partition (0 if it does not exist).
    pub async fn entry_count(&self, partition: &str) -> usize {
        self.partitions
            .read()
            .await
            .get(partition)
            .map(HashMap::len)
            .unwrap_or(0)
    }

    /// Whether a partition currently holds an entry for the URL.
    pub async fn contains(&self, partition: &str, url: &str) -> bool {
        self.partitions
            .read()
            .await
            .get(partition)
            .is_some_and(|p| p.contains_key(url))
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, partition: &str) -> Result<()> {
        self.partitions
            .write()
            .await
            .entry(partition.to_string())
            .or_default();
        Ok(())
    }

    async fn match_url(&self, partition: &str, url: &str) -> Result<Option<Response>> {
        let partitions = self.partitions.read().await;
        Ok(partitions
            .get(partition)
            .and_then(|p| p.get(url))
            .cloned()
            .map(|r| r.with_source(ResponseSource::Cache)))
    }

    async fn put(&self, partition: &str, url: &str, response: &Response) -> Result<()> {
        self.partitions
            .write()
            .await
            .entry(partition.to_string())
            .or_default()
            .insert(url.to_string(), response.clone());
        Ok(())
    }

    async fn partitions(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.partitions.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn delete_partition(&self, partition: &str) -> Result<bool> {
        Ok(self.partitions.write().await.remove(partition).is_some())
    }
}
