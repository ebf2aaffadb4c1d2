//! HTTP fetcher for provider feeds and the Azure confirmation pages.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::ExportError;

#[cfg(test)]
use mockall::automock;

/// Maximum accepted response size (64 MB).
/// The Azure Service Tags document, the largest feed, is under 10 MB.
pub const MAX_RESPONSE_SIZE: usize = 64 * 1024 * 1024;

const JSON_ACCEPT: &str = "application/json";
const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const HTML_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Source of remote documents.
///
/// Every acquisition step goes through this trait so the pipeline can be
/// driven by canned documents in tests.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HttpSource: Send + Sync {
    /// GET `url` expecting a JSON body
    async fn fetch_json(&self, url: &str) -> Result<Value, ExportError>;

    /// GET `url` as a browser would, returning the HTML body as text
    async fn fetch_html(&self, url: &str) -> Result<String, ExportError>;
}

/// reqwest-backed [`HttpSource`]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    max_response_size: usize,
}

impl Fetcher {
    /// Create a fetcher with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, ExportError> {
        let mut headers = HeaderMap::new();
        // No content-encoding negotiation
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("cloud-ipv4/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(ExportError::Client)?;

        Ok(Self {
            client,
            timeout,
            max_response_size: MAX_RESPONSE_SIZE,
        })
    }

    /// Override the response size limit (default [`MAX_RESPONSE_SIZE`])
    pub fn with_max_response_size(mut self, max: usize) -> Self {
        self.max_response_size = max;
        self
    }

    /// Send a request and return the body of a successful response
    async fn fetch_text(&self, url: &str, request: RequestBuilder) -> Result<String, ExportError> {
        debug!("GET {}", url);

        let mut response = request
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let max = self.max_response_size;
        if let Some(content_length) = response.content_length() {
            if content_length > max as u64 {
                return Err(ExportError::TooLarge {
                    url: url.to_string(),
                    size: usize::try_from(content_length).unwrap_or(usize::MAX),
                    max,
                });
            }
        }

        // Content-Length may be absent (chunked transfer), so cap while reading
        let mut bytes: Vec<u8> = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.transport_error(url, e))?
        {
            let size = bytes.len() + chunk.len();
            if size > max {
                return Err(ExportError::TooLarge {
                    url: url.to_string(),
                    size,
                    max,
                });
            }
            bytes.extend_from_slice(&chunk);
        }
        let body = String::from_utf8_lossy(&bytes).into_owned();

        debug!("GET {} -> {} ({} bytes)", url, status, body.len());
        Ok(body)
    }

    fn transport_error(&self, url: &str, e: reqwest::Error) -> ExportError {
        if e.is_timeout() {
            ExportError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            ExportError::Network {
                url: url.to_string(),
                source: e,
            }
        }
    }
}

#[async_trait]
impl HttpSource for Fetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, ExportError> {
        let request = self.client.get(url).header(ACCEPT, JSON_ACCEPT);
        let body = self.fetch_text(url, request).await?;
        serde_json::from_str(&body).map_err(|e| ExportError::decode(url, e))
    }

    async fn fetch_html(&self, url: &str) -> Result<String, ExportError> {
        let request = self
            .client
            .get(url)
            .header(ACCEPT, HTML_ACCEPT)
            .header(ACCEPT_LANGUAGE, HTML_ACCEPT_LANGUAGE);
        self.fetch_text(url, request).await
    }
}
