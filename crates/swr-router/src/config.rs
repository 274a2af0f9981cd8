//! Router configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use swr_core::{Error, Result};
use url::Url;

/// Names of the cache partitions the router owns.
///
/// Bumping the version suffix orphans the previous partitions, which the next
/// activation deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionNames {
    /// Fonts, scripts, styles and the precached shell.
    pub static_assets: String,
    /// API responses, images and pages.
    pub dynamic: String,
    /// Retained on activation but never written.
    pub legacy: String,
}

impl PartitionNames {
    pub fn versioned(prefix: &str, version: &str) -> Self {
        Self {
            static_assets: format!("{}-static-{}", prefix, version),
            dynamic: format!("{}-dynamic-{}", prefix, version),
            legacy: format!("{}-cache-{}", prefix, version),
        }
    }

    /// Partitions that survive activation cleanup.
    pub fn recognized(&self) -> [&str; 3] {
        [
            self.legacy.as_str(),
            self.static_assets.as_str(),
            self.dynamic.as_str(),
        ]
    }

    pub fn is_recognized(&self, name: &str) -> bool {
        self.recognized().contains(&name)
    }
}

impl Default for PartitionNames {
    fn default() -> Self {
        Self::versioned("swr", "v1")
    }
}

/// Router configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Origin (and path) the worker is registered for.
    pub scope: Url,
    /// Deployment subdirectory, e.g. `/console`. Empty at the site root.
    #[serde(default)]
    pub base_path: String,
    #[serde(default)]
    pub partitions: PartitionNames,
    /// Paths cached into the static partition on install, relative to the base path.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,
}

fn default_precache() -> Vec<String> {
    vec![
        "/".to_string(),
        "/index.html".to_string(),
        "/manifest.json".to_string(),
    ]
}

/// Detect a subdirectory deployment from the scope URL.
///
/// Project pages on `*.github.io` are served under `/<repo>`; everything
/// else is assumed to live at the site root.
pub fn detect_base_path(scope: &Url) -> String {
    let on_project_pages = scope
        .host_str()
        .is_some_and(|host| host.ends_with(".github.io"));
    if !on_project_pages {
        return String::new();
    }

    // Only a directory segment counts; `/sw.js` at the root is not a base path.
    let segments: Vec<&str> = scope.path_segments().map(Iterator::collect).unwrap_or_default();
    match segments.as_slice() {
        [first, _, ..] if !first.is_empty() => format!("/{}", first),
        _ => String::new(),
    }
}

fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

impl RouterConfig {
    /// Create a config for a scope, detecting the base path from it.
    pub fn new(scope: Url) -> Self {
        let base_path = detect_base_path(&scope);
        Self {
            scope,
            base_path,
            partitions: PartitionNames::default(),
            precache: default_precache(),
        }
    }

    /// Parse the scope URL and build a config.
    pub fn for_scope(scope: &str) -> Result<Self> {
        Ok(Self::new(Url::parse(scope)?))
    }

    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = normalize_base_path(base_path);
        self
    }

    pub fn with_partitions(mut self, partitions: PartitionNames) -> Self {
        self.partitions = partitions;
        self
    }

    pub fn with_precache(mut self, precache: Vec<String>) -> Self {
        self.precache = precache;
        self
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self =
            serde_yaml::from_str(&contents).map_err(|e| Error::Config(e.to_string()))?;
        config.base_path = normalize_base_path(&config.base_path);
        Ok(config)
    }

    /// Resolve a site path under the base path, e.g. `/index.html` to
    /// `https://host/console/index.html`.
    pub fn site_url(&self, path: &str) -> Result<Url> {
        let joined = format!("{}/{}", self.base_path, path.trim_start_matches('/'));
        Ok(self.scope.join(&joined)?)
    }

    /// Resolve a client-supplied URL against the scope. Absolute URLs are
    /// kept as they are.
    pub fn resolve(&self, url: &str) -> Result<Url> {
        Ok(self.scope.join(url)?)
    }

    /// URL of the root document served as the last offline fallback.
    pub fn root_document_url(&self) -> Result<Url> {
        self.site_url("/")
    }

    /// Absolute URLs of the install-time manifest.
    pub fn precache_urls(&self) -> Result<Vec<Url>> {
        self.precache.iter().map(|p| self.site_url(p)).collect()
    }

    /// Whether a URL shares the scope's origin.
    pub fn is_same_origin(&self, url: &Url) -> bool {
        url.origin() == self.scope.origin()
    }
}
