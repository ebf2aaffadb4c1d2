//! Runtime configuration for cloud-ipv4.
//!
//! The configuration is read once from the environment at process start,
//! adjusted by command-line overrides, validated, and then passed by
//! reference into every component. Nothing reads the environment after that.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::discovery;
use crate::error::ExportError;

/// Default per-request HTTP timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: f64 = 20.0;

/// Default output script location
pub const DEFAULT_OUT_FILE: &str = "dist/all.rsc";

pub const DEFAULT_AWS_URL: &str = "https://ip-ranges.amazonaws.com/ip-ranges.json";
pub const DEFAULT_GCP_URL: &str = "https://www.gstatic.com/ipranges/goog.json";

/// Download confirmation pages that embed the weekly Azure Service Tags link.
/// Tried in order; the first page wins.
pub const AZURE_CONFIRMATION_URLS: &[&str] = &[
    "https://www.microsoft.com/en-us/download/confirmation.aspx?id=56519",
    "https://www.microsoft.com/en-us/download/confirmation.aspx?id=56519&culture=en-us&country=US",
];

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    /// Timeout applied to every HTTP request
    pub http_timeout: Duration,

    /// Where the RouterOS script is written
    pub out_file: PathBuf,

    /// AWS ip-ranges.json location
    pub aws_url: String,

    /// Google goog.json location
    pub gcp_url: String,

    /// Pinned Azure Service Tags JSON; `None` means scrape the confirmation pages
    pub azure_url: Option<String>,

    /// Confirmation pages searched when no Azure URL is pinned
    pub azure_confirmation_urls: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs_f64(DEFAULT_HTTP_TIMEOUT_SECS),
            out_file: PathBuf::from(DEFAULT_OUT_FILE),
            aws_url: DEFAULT_AWS_URL.to_string(),
            gcp_url: DEFAULT_GCP_URL.to_string(),
            azure_url: None,
            azure_confirmation_urls: AZURE_CONFIRMATION_URLS
                .iter()
                .map(|u| u.to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Build configuration from process environment variables
    pub fn from_env() -> Result<Self, ExportError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Empty or whitespace-only values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ExportError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(raw) = get("HTTP_TIMEOUT") {
            config.http_timeout = parse_timeout(&raw)?;
        }
        if let Some(out) = get("OUT_FILE") {
            config.out_file = PathBuf::from(out);
        }
        if let Some(url) = get("AWS_URL") {
            config.aws_url = url;
        }
        if let Some(url) = get("GCP_URL") {
            config.gcp_url = url;
        }
        config.azure_url = get("AZURE_URL");

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.http_timeout.is_zero() {
            return Err(ExportError::Config(
                "HTTP timeout must be greater than zero".to_string(),
            ));
        }

        if self.out_file.as_os_str().is_empty() {
            return Err(ExportError::Config("Output file path is empty".to_string()));
        }

        for (name, url) in [("AWS_URL", &self.aws_url), ("GCP_URL", &self.gcp_url)] {
            if !url.starts_with("https://") {
                return Err(ExportError::Config(format!(
                    "{} must use HTTPS: {}",
                    name, url
                )));
            }
        }

        // Discovery checks this too; a bad override must not cost any requests
        if let Some(ref url) = self.azure_url {
            discovery::validate_override(url)?;
        } else if self.azure_confirmation_urls.is_empty() {
            return Err(ExportError::Config(
                "No Azure URL pinned and no confirmation pages to search".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parse a timeout given in (possibly fractional) seconds
pub fn parse_timeout(raw: &str) -> Result<Duration, ExportError> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ExportError::Config(format!("Invalid HTTP_TIMEOUT '{}'", raw)))?;

    if !secs.is_finite() || secs <= 0.0 {
        return Err(ExportError::Config(format!(
            "HTTP_TIMEOUT must be a positive number of seconds, got '{}'",
            raw
        )));
    }

    Duration::try_from_secs_f64(secs)
        .map_err(|_| ExportError::Config(format!("HTTP_TIMEOUT out of range: '{}'", raw)))
}
