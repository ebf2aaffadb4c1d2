//! Error types for the acquisition pipeline.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },

    #[error("Timed out after {timeout:?} waiting for {url}")]
    Timeout { url: String, timeout: Duration },

    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Response from {url} too large: {size} bytes (max: {max} bytes)")]
    TooLarge { url: String, size: usize, max: usize },

    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Discovery error: {0}")]
    Discovery(String),
}

impl ExportError {
    /// Wrap a JSON error with the URL of the document that produced it
    pub fn decode(url: &str, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.to_string(),
            source,
        }
    }
}
