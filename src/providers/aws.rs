//! AWS `ip-ranges.json` extractor.

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{Provider, ProviderPrefixes};
use crate::error::ExportError;
use crate::fetcher::HttpSource;
use crate::utils::format_count;

#[derive(Deserialize)]
struct AwsRanges {
    #[serde(default)]
    prefixes: Vec<AwsPrefix>,
}

#[derive(Deserialize)]
struct AwsPrefix {
    ip_prefix: Option<String>,
}

/// Extract `prefixes[].ip_prefix` in document order, skipping records without it
pub fn extract(document: Value) -> Result<Vec<String>, serde_json::Error> {
    let ranges: AwsRanges = serde_json::from_value(document)?;
    Ok(ranges
        .prefixes
        .into_iter()
        .filter_map(|p| p.ip_prefix)
        .collect())
}

/// Fetch and extract the AWS feed
pub async fn fetch(source: &dyn HttpSource, url: &str) -> Result<ProviderPrefixes, ExportError> {
    info!("Fetching AWS ranges...");
    let document = source.fetch_json(url).await?;
    let prefixes = extract(document).map_err(|e| ExportError::decode(url, e))?;
    info!("Fetched AWS - {} IPv4 prefixes", format_count(prefixes.len()));
    Ok(ProviderPrefixes::new(Provider::Aws, prefixes))
}
