//! Control messages posted by the hosting page.

use serde::{Deserialize, Serialize};
use swr_core::Error;

/// Wire shape: `{ "type": "...", "payload": ... }`.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CacheUrlsPayload {
    urls: Vec<String>,
}

/// Administrative command for the worker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Envelope")]
pub enum ControlMessage {
    /// Activate the installed worker without waiting.
    SkipWaiting,
    /// Fetch and store these URLs in the dynamic partition.
    CacheUrls(Vec<String>),
    /// Delete every cache partition.
    ClearCache,
    /// Unrecognized `type`; logged and ignored.
    Unknown(String),
}

impl TryFrom<Envelope> for ControlMessage {
    type Error = Error;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        match envelope.kind.as_str() {
            "SKIP_WAITING" => Ok(Self::SkipWaiting),
            "CLEAR_CACHE" => Ok(Self::ClearCache),
            "CACHE_URLS" => {
                let payload = envelope.payload.ok_or_else(|| {
                    Error::InvalidMessage("CACHE_URLS requires a payload".to_string())
                })?;
                let payload: CacheUrlsPayload = serde_json::from_value(payload)
                    .map_err(|e| Error::InvalidMessage(format!("CACHE_URLS payload: {}", e)))?;
                Ok(Self::CacheUrls(payload.urls))
            }
            _ => Ok(Self::Unknown(envelope.kind)),
        }
    }
}

impl ControlMessage {
    /// Message type as it appears on the wire.
    pub fn kind(&self) -> &str {
        match self {
            Self::SkipWaiting => "SKIP_WAITING",
            Self::CacheUrls(_) => "CACHE_URLS",
            Self::ClearCache => "CLEAR_CACHE",
            Self::Unknown(kind) => kind,
        }
    }
}

/// Result of handling a control message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MessageOutcome {
    SkippedWaiting {
        /// Whether this call moved the worker to activated.
        activated: bool,
    },
    Cached {
        cached: Vec<String>,
        failed: Vec<String>,
    },
    Cleared {
        deleted: Vec<String>,
    },
    Ignored {
        message_type: String,
    },
}
