//! Error types for swr.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // Cache errors
    #[error("Cache storage unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Cache write failed for {url}: {reason}")]
    CacheWrite { url: String, reason: String },

    #[error("Invalid partition name: {0}")]
    InvalidPartition(String),

    // Input errors
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid control message: {0}")]
    InvalidMessage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // Infrastructure errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::InvalidUrl(err.to_string())
    }
}
