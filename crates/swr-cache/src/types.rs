//! Persisted entry format.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use swr_core::{Headers, Response, ResponseSource};

/// A cached (request URL, response snapshot) pair as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEntry {
    /// Full request URL.
    pub url: String,
    pub status: u16,
    #[serde(default)]
    pub headers: Headers,
    /// Body, base64 encoded on disk.
    #[serde(with = "base64_body")]
    pub body: Vec<u8>,
    /// When the entry was written. Entries never expire by time.
    pub cached_at: DateTime<Utc>,
}

impl StoredEntry {
    pub fn new(url: &str, response: &Response) -> Self {
        Self {
            url: url.to_string(),
            status: response.status,
            headers: response.headers.clone(),
            body: response.body.clone(),
            cached_at: Utc::now(),
        }
    }

    pub fn into_response(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
            source: ResponseSource::Cache,
        }
    }
}

mod base64_body {
    use super::*;

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
