//! Azure Service Tags extractor.

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{Provider, ProviderPrefixes};
use crate::config::Config;
use crate::discovery::discover_azure_url;
use crate::error::ExportError;
use crate::fetcher::HttpSource;
use crate::utils::format_count;

#[derive(Deserialize)]
struct ServiceTags {
    #[serde(default)]
    values: Vec<ServiceTag>,
}

#[derive(Deserialize)]
struct ServiceTag {
    properties: Option<ServiceTagProperties>,
}

#[derive(Deserialize)]
struct ServiceTagProperties {
    #[serde(rename = "addressPrefixes", default)]
    address_prefixes: Vec<String>,
}

/// IPv6 prefixes always contain a colon, IPv4 prefixes never do
fn is_ipv4(prefix: &str) -> bool {
    !prefix.contains(':')
}

/// Flatten `values[].properties.addressPrefixes`, keeping IPv4 entries only.
///
/// Document order and per-tag order are preserved.
pub fn extract(document: Value) -> Result<Vec<String>, serde_json::Error> {
    let tags: ServiceTags = serde_json::from_value(document)?;
    Ok(tags
        .values
        .into_iter()
        .filter_map(|tag| tag.properties)
        .flat_map(|props| props.address_prefixes)
        .filter(|p| is_ipv4(p))
        .collect())
}

/// Locate the current Service Tags document, then fetch and extract it
pub async fn fetch(source: &dyn HttpSource, config: &Config) -> Result<ProviderPrefixes, ExportError> {
    info!("Fetching Azure ranges...");
    let url = discover_azure_url(config, source).await?;
    let document = source.fetch_json(&url).await?;
    let prefixes = extract(document).map_err(|e| ExportError::decode(&url, e))?;
    info!("Fetched Azure - {} IPv4 prefixes", format_count(prefixes.len()));
    Ok(ProviderPrefixes::new(Provider::Azure, prefixes))
}
