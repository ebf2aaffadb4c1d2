//! Azure Service Tags URL discovery.
//!
//! Microsoft publishes the Service Tags document under a filename that
//! changes every week and offers no stable link to it. The current URL is
//! either pinned through configuration or scraped from the download
//! confirmation pages. Both strategies sit behind [`FeedLocator`] so the
//! scraper can be replaced without touching the extractors.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Url;
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ExportError;
use crate::fetcher::HttpSource;

/// Host suffix every Service Tags download must live under
pub const AZURE_DOWNLOAD_HOST: &str = "download.microsoft.com";

static FEED_FILENAME_REGEX: OnceLock<Regex> = OnceLock::new();
static FEED_LINK_REGEX: OnceLock<Regex> = OnceLock::new();
static ESCAPED_FEED_LINK_REGEX: OnceLock<Regex> = OnceLock::new();

fn feed_filename_regex() -> &'static Regex {
    FEED_FILENAME_REGEX
        .get_or_init(|| Regex::new(r"(?i)^ServiceTags_Public_.*\.json$").expect("Invalid Regex"))
}

fn feed_link_regex() -> &'static Regex {
    FEED_LINK_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)https://download\.microsoft\.com/[^"]*ServiceTags_Public_[^"]*\.json"#)
            .expect("Invalid Regex")
    })
}

/// Same link with every `/` written as `\/`, as it appears inside JSON blobs
fn escaped_feed_link_regex() -> &'static Regex {
    ESCAPED_FEED_LINK_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?i)https:\\/\\/download\.microsoft\.com\\/[^"]*ServiceTags_Public_[^"]*\.json"#,
        )
        .expect("Invalid Regex")
    })
}

/// Strategy for finding the current Service Tags document
#[async_trait]
pub trait FeedLocator: Send + Sync {
    /// Resolve the URL of the Service Tags JSON
    async fn locate(&self, source: &dyn HttpSource) -> Result<String, ExportError>;
}

/// A URL supplied by the operator, validated once and used as-is
#[derive(Debug, Clone)]
pub struct PinnedUrl {
    url: String,
}

impl PinnedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, ExportError> {
        let url = url.into();
        validate_override(&url)?;
        Ok(Self { url })
    }
}

#[async_trait]
impl FeedLocator for PinnedUrl {
    async fn locate(&self, _source: &dyn HttpSource) -> Result<String, ExportError> {
        info!("Using pinned Azure URL {}", self.url);
        Ok(self.url.clone())
    }
}

/// Scrapes the download confirmation pages, in order, for the weekly link
#[derive(Debug, Clone)]
pub struct ConfirmationPages {
    pages: Vec<String>,
}

impl ConfirmationPages {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }
}

#[async_trait]
impl FeedLocator for ConfirmationPages {
    async fn locate(&self, source: &dyn HttpSource) -> Result<String, ExportError> {
        for page in &self.pages {
            debug!("Searching {} for the Service Tags link", page);
            let html = source.fetch_html(page).await?;
            if let Some(url) = find_feed_link(&html) {
                info!("Discovered Azure URL {}", url);
                return Ok(url);
            }
            debug!("No Service Tags link on {}", page);
        }

        Err(ExportError::Discovery(format!(
            "could not locate the Azure ServiceTags_Public JSON link on {} confirmation page(s); \
             set AZURE_URL to the direct {} JSON",
            self.pages.len(),
            AZURE_DOWNLOAD_HOST
        )))
    }
}

/// Pick the locator the configuration asks for
pub fn locator_for(config: &Config) -> Result<Box<dyn FeedLocator>, ExportError> {
    match config.azure_url {
        Some(ref url) => Ok(Box::new(PinnedUrl::new(url.clone())?)),
        None => Ok(Box::new(ConfirmationPages::new(
            config.azure_confirmation_urls.clone(),
        ))),
    }
}

/// Resolve the Service Tags URL for this run
pub async fn discover_azure_url(
    config: &Config,
    source: &dyn HttpSource,
) -> Result<String, ExportError> {
    locator_for(config)?.locate(source).await
}

/// Check that an override points at a Service Tags file on Microsoft's download host
pub fn validate_override(url: &str) -> Result<(), ExportError> {
    let parsed = Url::parse(url)
        .map_err(|e| ExportError::Config(format!("AZURE_URL is not a valid URL ({}): {}", e, url)))?;

    let host = parsed.host_str().unwrap_or_default();
    if !host.ends_with(AZURE_DOWNLOAD_HOST) {
        return Err(ExportError::Config(format!(
            "AZURE_URL must point to {}: {}",
            AZURE_DOWNLOAD_HOST, url
        )));
    }

    let filename = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    if !feed_filename_regex().is_match(filename) {
        return Err(ExportError::Config(format!(
            "AZURE_URL must be a ServiceTags_Public_*.json file: {}",
            url
        )));
    }

    Ok(())
}

/// Find the first Service Tags link in a page body.
///
/// The plain form is tried first; a JSON-escaped (`\/`) match is unescaped.
pub fn find_feed_link(html: &str) -> Option<String> {
    if let Some(m) = feed_link_regex().find(html) {
        return Some(m.as_str().to_string());
    }
    escaped_feed_link_regex()
        .find(html)
        .map(|m| m.as_str().replace("\\/", "/"))
}
