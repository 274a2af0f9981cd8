//! Filesystem-backed cache storage.
//!
//! Layout: `<root>/<partition>/<entry_key(url)>.json`. Entries are written to
//! a temporary file and renamed into place so readers never observe a
//! partially written entry.

use crate::keys::{entry_key, sanitize_partition_name};
use crate::types::StoredEntry;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use swr_core::ports::CacheStorage;
use swr_core::{Error, Response, Result};
use tracing::{debug, warn};

/// Cache partitions persisted as directories under a root.
#[derive(Debug, Clone)]
pub struct FilesystemCacheStorage {
    root_dir: PathBuf,
}

impl FilesystemCacheStorage {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn partition_dir(&self, partition: &str) -> Result<PathBuf> {
        Ok(self.root_dir.join(sanitize_partition_name(partition)?))
    }

    fn entry_path(&self, partition: &str, url: &str) -> Result<PathBuf> {
        Ok(self
            .partition_dir(partition)?
            .join(format!("{}.json", entry_key(url))))
    }
}

fn unavailable(context: &str, err: std::io::Error) -> Error {
    Error::CacheUnavailable(format!("{}: {}", context, err))
}

#[async_trait]
impl CacheStorage for FilesystemCacheStorage {
    async fn open(&self, partition: &str) -> Result<()> {
        let dir = self.partition_dir(partition)?;
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| unavailable("Failed to create partition dir", e))
    }

    async fn match_url(&self, partition: &str, url: &str) -> Result<Option<Response>> {
        let path = self.entry_path(partition, url)?;
        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(unavailable("Failed to read cache entry", e)),
        };

        let entry: StoredEntry = serde_json::from_slice(&contents)?;
        if entry.url != url {
            warn!(url, stored = %entry.url, "Cache key collision, ignoring entry");
            return Ok(None);
        }
        Ok(Some(entry.into_response()))
    }

    async fn put(&self, partition: &str, url: &str, response: &Response) -> Result<()> {
        let path = self.entry_path(partition, url)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| unavailable("Failed to create partition dir", e))?;
        }

        let contents = serde_json::to_vec(&StoredEntry::new(url, response))?;
        let tmp_path = path.with_extension(format!("tmp-{}", uuid::Uuid::new_v4()));

        let write_err = |e: std::io::Error| Error::CacheWrite {
            url: url.to_string(),
            reason: e.to_string(),
        };
        tokio::fs::write(&tmp_path, contents).await.map_err(write_err)?;
        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(write_err(e));
        }

        debug!(partition, url, "Cache entry written");
        Ok(())
    }

    async fn partitions(&self) -> Result<Vec<String>> {
        let mut read_dir = match tokio::fs::read_dir(&self.root_dir).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(unavailable("Failed to read cache root", e)),
        };

        let mut names = vec![];
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| unavailable("Failed to read cache root", e))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false);
            if is_dir {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn delete_partition(&self, partition: &str) -> Result<bool> {
        let dir = self.partition_dir(partition)?;
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(unavailable("Failed to delete partition", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use swr_core::ResponseSource;

    #[tokio::test]
    async fn test_entries_survive_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let url = "https://example.com/index.html";
        let response = Response::new(200)
            .with_header("content-type", "text/html")
            .with_body("<html></html>");

        FilesystemCacheStorage::new(dir.path())
            .put("swr-static-v1", url, &response)
            .await
            .unwrap();

        let reopened = FilesystemCacheStorage::new(dir.path());
        let hit = reopened
            .match_url("swr-static-v1", url)
            .await
            .unwrap()
            .expect("entry should persist");
        assert_eq!(hit.status, 200);
        assert_eq!(hit.header("content-type"), Some("text/html"));
        assert_eq!(hit.body_text(), "<html></html>");
        assert_eq!(hit.source, ResponseSource::Cache);
    }

    #[tokio::test]
    async fn test_missing_root_lists_no_partitions() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FilesystemCacheStorage::new(dir.path().join("absent"));
        assert!(storage.partitions().await.unwrap().is_empty());
        assert!(storage.match_url("p", "https://example.com/").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_partition_removes_entries() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FilesystemCacheStorage::new(dir.path());
        storage.open("swr-dynamic-v0").await.unwrap();
        storage
            .put("swr-dynamic-v1", "https://example.com/demo", &Response::new(200))
            .await
            .unwrap();

        assert_eq!(
            storage.partitions().await.unwrap(),
            vec!["swr-dynamic-v0", "swr-dynamic-v1"]
        );
        assert!(storage.delete_partition("swr-dynamic-v0").await.unwrap());
        assert!(!storage.delete_partition("swr-dynamic-v0").await.unwrap());
        assert_eq!(storage.partitions().await.unwrap(), vec!["swr-dynamic-v1"]);
    }

    #[tokio::test]
    async fn test_rejects_unsafe_partition_names() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FilesystemCacheStorage::new(dir.path());
        let err = storage.open("../escape").await.unwrap_err();
        assert!(matches!(err, Error::InvalidPartition(_)));
    }
}
