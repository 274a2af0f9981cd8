//! Gateway configuration.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use swr_core::{Error, Result};
use swr_router::{PartitionNames, RouterConfig};
use url::Url;

/// Gateway configuration, loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Address to listen on.
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,
    /// Origin that requests are forwarded to.
    #[serde(default = "default_upstream")]
    pub upstream: Url,
    /// Deployment subdirectory on the upstream.
    #[serde(default)]
    pub base_path: String,
    #[serde(default)]
    pub partitions: PartitionNames,
    /// Install-time manifest. Defaults to the root document, `index.html`
    /// and `manifest.json`.
    #[serde(default)]
    pub precache: Option<Vec<String>>,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Upstream request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Where cache partitions live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageConfig {
    #[default]
    Memory,
    Filesystem {
        dir: PathBuf,
    },
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8787))
}

fn default_upstream() -> Url {
    Url::parse("http://127.0.0.1:3000/").expect("default upstream is a valid URL")
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            upstream: default_upstream(),
            base_path: String::new(),
            partitions: PartitionNames::default(),
            precache: None,
            storage: StorageConfig::default(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load from a file when given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Router configuration scoped to the upstream origin.
    pub fn router_config(&self) -> RouterConfig {
        let mut config = RouterConfig::new(self.upstream.clone())
            .with_partitions(self.partitions.clone());
        if !self.base_path.is_empty() {
            config = config.with_base_path(&self.base_path);
        }
        if let Some(precache) = &self.precache {
            config = config.with_precache(precache.clone());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.listen.port(), 8787);
        assert_eq!(config.storage, StorageConfig::Memory);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.yaml");
        std::fs::write(
            &path,
            r#"
listen: 0.0.0.0:9000
upstream: https://status.example.com/
base_path: /console
partitions:
  static_assets: site-static-v3
  dynamic: site-dynamic-v3
  legacy: site-cache-v3
precache: ["/", "/offline.html"]
storage:
  kind: filesystem
  dir: /var/cache/swr
"#,
        )
        .unwrap();

        let config = GatewayConfig::from_file(&path).unwrap();
        assert_eq!(config.listen.port(), 9000);
        assert_eq!(
            config.storage,
            StorageConfig::Filesystem {
                dir: PathBuf::from("/var/cache/swr")
            }
        );

        let router = config.router_config();
        assert_eq!(router.base_path, "/console");
        assert_eq!(router.partitions.static_assets, "site-static-v3");
        assert_eq!(
            router.root_document_url().unwrap().as_str(),
            "https://status.example.com/console/"
        );
        assert_eq!(router.precache, vec!["/", "/offline.html"]);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.yaml");
        std::fs::write(&path, "listen: [not, an, address]").unwrap();
        assert!(matches!(
            GatewayConfig::from_file(&path),
            Err(Error::Config(_))
        ));
    }
}
