//! Google Cloud `goog.json` extractor.

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{Provider, ProviderPrefixes};
use crate::error::ExportError;
use crate::fetcher::HttpSource;
use crate::utils::format_count;

#[derive(Deserialize)]
struct GoogleRanges {
    #[serde(default)]
    prefixes: Vec<GooglePrefix>,
}

#[derive(Deserialize)]
struct GooglePrefix {
    #[serde(rename = "ipv4Prefix")]
    ipv4_prefix: Option<String>,
}

/// Extract `prefixes[].ipv4Prefix` in document order, skipping IPv6 records
pub fn extract(document: Value) -> Result<Vec<String>, serde_json::Error> {
    let ranges: GoogleRanges = serde_json::from_value(document)?;
    Ok(ranges
        .prefixes
        .into_iter()
        .filter_map(|p| p.ipv4_prefix)
        .collect())
}

/// Fetch and extract the Google feed
pub async fn fetch(source: &dyn HttpSource, url: &str) -> Result<ProviderPrefixes, ExportError> {
    info!("Fetching GCP ranges...");
    let document = source.fetch_json(url).await?;
    let prefixes = extract(document).map_err(|e| ExportError::decode(url, e))?;
    info!("Fetched GCP - {} IPv4 prefixes", format_count(prefixes.len()));
    Ok(ProviderPrefixes::new(Provider::Gcp, prefixes))
}
