//! Minimal HTTP request/response model shared by the router and its adapters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::{Error, Result};

/// Header map keyed by lowercase header name.
pub type Headers = BTreeMap<String, String>;

/// Body of the synthetic 503 returned for API requests with no cached copy.
pub const SERVICE_UNAVAILABLE_BODY: &str = r#"{"error":"Service unavailable"}"#;

/// Body of the synthetic 404 returned for pages with no offline fallback.
pub const PAGE_OFFLINE_BODY: &str = "Page not available offline";

/// HTTP request method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "HEAD" => Ok(Self::Head),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "OPTIONS" => Ok(Self::Options),
            other => Err(Error::Other(format!("Unsupported method: {}", other))),
        }
    }
}

/// An outbound request as seen by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Build a GET request, parsing the URL.
    pub fn get(url: &str) -> Result<Self> {
        Ok(Self::new(Method::Get, Url::parse(url)?))
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// URL path component.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Cache key for this request: the full URL.
    pub fn cache_key(&self) -> &str {
        self.url.as_str()
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    #[default]
    Network,
    Cache,
    Synthetic,
}

/// A response snapshot. Cloning yields an independent copy, which is what
/// gets written into a cache partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
    pub source: ResponseSource,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
            source: ResponseSource::Network,
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_source(mut self, source: ResponseSource) -> Self {
        self.source = source;
        self
    }

    /// True for 2xx statuses.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Empty 404.
    pub fn not_found() -> Self {
        Self::new(404).with_source(ResponseSource::Synthetic)
    }

    /// 404 with a plain-text body.
    pub fn not_found_text(message: &str) -> Self {
        Self::not_found()
            .with_header("content-type", "text/plain")
            .with_body(message.as_bytes())
    }

    /// 503 with the JSON error body used for unreachable API calls.
    pub fn service_unavailable() -> Self {
        Self::new(503)
            .with_source(ResponseSource::Synthetic)
            .with_header("content-type", "application/json")
            .with_body(SERVICE_UNAVAILABLE_BODY.as_bytes())
    }
}
