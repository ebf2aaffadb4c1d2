//! End-to-end export: fetch all providers, merge, emit.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use crate::aggregator::{count_addresses, merge};
use crate::config::Config;
use crate::error::ExportError;
use crate::fetcher::HttpSource;
use crate::providers::{aws, azure, gcp, Provider, ProviderPrefixes};
use crate::routeros;
use crate::utils::format_count;

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Script location, or `None` for a dry run
    pub out_file: Option<PathBuf>,
    /// Number of unique prefixes in the script
    pub prefix_count: usize,
    /// Addresses covered by the merged list (overlaps counted twice)
    pub address_count: u64,
    /// Raw prefix count per provider, in merge order
    pub sources: Vec<(Provider, usize)>,
}

/// Fetch all three providers.
///
/// The fetches run concurrently but the result is always in AWS, GCP,
/// Azure order. The first failure aborts the others.
pub async fn collect(
    config: &Config,
    source: &dyn HttpSource,
) -> Result<Vec<ProviderPrefixes>, ExportError> {
    let (aws, gcp, azure) = tokio::try_join!(
        aws::fetch(source, &config.aws_url),
        gcp::fetch(source, &config.gcp_url),
        azure::fetch(source, config),
    )?;
    Ok(vec![aws, gcp, azure])
}

/// Run the export.
///
/// Nothing is written unless every provider was fetched and merged. With
/// `dry_run` the script goes to stdout instead of `config.out_file`.
pub async fn run(config: &Config, source: &dyn HttpSource, dry_run: bool) -> Result<ExportSummary> {
    let lists = collect(config, source)
        .await
        .context("Failed to collect provider ranges")?;

    let sources: Vec<(Provider, usize)> = lists
        .iter()
        .map(|list| (list.provider, list.prefixes.len()))
        .collect();
    let raw_total: usize = sources.iter().map(|(_, count)| count).sum();

    let merged = merge(&lists);
    let address_count = count_addresses(&merged);

    info!(
        "Merged {} prefixes -> {} unique ({} addresses)",
        format_count(raw_total),
        format_count(merged.len()),
        address_count
    );

    let out_file = if dry_run {
        info!("Dry-run mode: script printed, {:?} untouched", config.out_file);
        let script = routeros::render_script(&merged, chrono::Utc::now().timestamp());
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(script.as_bytes())?;
        stdout.flush()?;
        None
    } else {
        routeros::emit(&merged, &config.out_file)
            .with_context(|| format!("Failed to write {:?}", config.out_file))?;
        Some(config.out_file.clone())
    };

    Ok(ExportSummary {
        out_file,
        prefix_count: merged.len(),
        address_count,
        sources,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::MockHttpSource;
    use serde_json::json;
    use tempfile::tempdir;

    const AWS_URL: &str = "https://aws.example/ip-ranges.json";
    const GCP_URL: &str = "https://gcp.example/goog.json";
    const AZURE_PINNED: &str = "https://download.microsoft.com/dl/ServiceTags_Public_20240101.json";
    const CONFIRMATION: &str = "https://www.microsoft.com/en-us/download/confirmation.aspx?id=56519";

    fn test_config(out_file: PathBuf, azure_url: Option<&str>) -> Config {
        Config {
            out_file,
            aws_url: AWS_URL.to_string(),
            gcp_url: GCP_URL.to_string(),
            azure_url: azure_url.map(|u| u.to_string()),
            azure_confirmation_urls: vec![CONFIRMATION.to_string()],
            ..Config::default()
        }
    }

    /// Mock serving the three feeds: a/24 b/24 | b/24 c/24 | d/24
    fn feeds_mock(azure_url: &'static str) -> MockHttpSource {
        let mut mock = MockHttpSource::new();
        mock.expect_fetch_json()
            .withf(|url| url == AWS_URL)
            .times(1)
            .returning(|_| {
                Ok(json!({"prefixes": [
                    {"ip_prefix": "a/24"},
                    {"ipv6_prefix": "2600::/40"},
                    {"ip_prefix": "b/24"}
                ]}))
            });
        mock.expect_fetch_json()
            .withf(|url| url == GCP_URL)
            .times(1)
            .returning(|_| {
                Ok(json!({"prefixes": [
                    {"ipv4Prefix": "b/24"},
                    {"ipv4Prefix": "c/24"}
                ]}))
            });
        mock.expect_fetch_json()
            .withf(move |url| url == azure_url)
            .times(1)
            .returning(|_| {
                Ok(json!({"values": [
                    {"properties": {"addressPrefixes": ["d/24", "2603:1000::/40"]}}
                ]}))
            });
        mock
    }

    #[tokio::test]
    async fn test_collect_keeps_provider_order() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path().join("all.rsc"), Some(AZURE_PINNED));
        let mut mock = feeds_mock(AZURE_PINNED);
        mock.expect_fetch_html().times(0);

        let lists = collect(&config, &mock).await.unwrap();
        let providers: Vec<Provider> = lists.iter().map(|l| l.provider).collect();
        assert_eq!(providers, Provider::ALL.to_vec());
        assert_eq!(lists[0].prefixes, vec!["a/24", "b/24"]);
        assert_eq!(lists[1].prefixes, vec!["b/24", "c/24"]);
        assert_eq!(lists[2].prefixes, vec!["d/24"]);
    }

    #[tokio::test]
    async fn test_run_writes_merged_script() {
        let dir = tempdir().unwrap();
        let out_file = dir.path().join("dist").join("all.rsc");
        let config = test_config(out_file.clone(), Some(AZURE_PINNED));
        let mock = feeds_mock(AZURE_PINNED);

        let summary = run(&config, &mock, false).await.unwrap();
        assert_eq!(summary.out_file.as_deref(), Some(out_file.as_path()));
        assert_eq!(summary.prefix_count, 4);
        assert_eq!(
            summary.sources,
            vec![(Provider::Aws, 2), (Provider::Gcp, 2), (Provider::Azure, 1)]
        );

        let content = std::fs::read_to_string(&out_file).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert!(lines[0].starts_with("# cloud-ipv4 export at "));
        assert!(lines[0].ends_with("; providers=aws,gcp,azure; count=4"));

        let removes = lines
            .iter()
            .filter(|l| l.starts_with("/ip/firewall/address-list/remove"))
            .count();
        assert_eq!(removes, 1);

        let added: Vec<&str> = lines
            .iter()
            .filter_map(|l| l.strip_prefix("/ip/firewall/address-list/add list=\"CloudAll\" address="))
            .map(|rest| rest.trim_end_matches(" comment=\"cloud-ipv4\""))
            .collect();
        assert_eq!(added, vec!["a/24", "b/24", "c/24", "d/24"]);
    }

    #[tokio::test]
    async fn test_run_discovers_azure_url() {
        const DISCOVERED: &str = "https://download.microsoft.com/dl/7/ServiceTags_Public_20240108.json";

        let dir = tempdir().unwrap();
        let config = test_config(dir.path().join("all.rsc"), None);
        let mut mock = feeds_mock(DISCOVERED);
        mock.expect_fetch_html()
            .withf(|url| url == CONFIRMATION)
            .times(1)
            .returning(|_| {
                Ok(r#"<script>{"url":"https:\/\/download.microsoft.com\/dl\/7\/ServiceTags_Public_20240108.json"}</script>"#.to_string())
            });

        let summary = run(&config, &mock, false).await.unwrap();
        assert_eq!(summary.prefix_count, 4);
    }

    #[tokio::test]
    async fn test_gcp_failure_writes_nothing() {
        let dir = tempdir().unwrap();
        let out_file = dir.path().join("dist").join("all.rsc");
        let config = test_config(out_file.clone(), Some(AZURE_PINNED));

        let mut mock = MockHttpSource::new();
        mock.expect_fetch_json()
            .withf(|url| url == AWS_URL)
            .returning(|_| Ok(json!({"prefixes": [{"ip_prefix": "a/24"}]})));
        mock.expect_fetch_json()
            .withf(|url| url == GCP_URL)
            .returning(|url| {
                Err(ExportError::Http {
                    url: url.to_string(),
                    status: 500,
                })
            });
        mock.expect_fetch_json()
            .withf(|url| url == AZURE_PINNED)
            .returning(|_| Ok(json!({"values": []})));

        let err = run(&config, &mock, false).await.unwrap_err();
        let root = err.downcast_ref::<ExportError>().unwrap();
        assert!(matches!(root, ExportError::Http { status: 500, .. }));
        assert!(!out_file.exists());
        assert!(!dir.path().join("dist").exists());
    }

    #[tokio::test]
    async fn test_discovery_failure_writes_nothing() {
        let dir = tempdir().unwrap();
        let out_file = dir.path().join("all.rsc");
        let config = test_config(out_file.clone(), None);

        let mut mock = MockHttpSource::new();
        mock.expect_fetch_json()
            .withf(|url| url == AWS_URL)
            .returning(|_| Ok(json!({"prefixes": []})));
        mock.expect_fetch_json()
            .withf(|url| url == GCP_URL)
            .returning(|_| Ok(json!({"prefixes": []})));
        mock.expect_fetch_html()
            .returning(|_| Ok("<html>maintenance</html>".to_string()));

        let err = run(&config, &mock, false).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExportError>(),
            Some(ExportError::Discovery(_))
        ));
        assert!(!out_file.exists());
    }

    #[tokio::test]
    async fn test_address_count_beyond_u32() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path().join("all.rsc"), Some(AZURE_PINNED));

        let mut mock = MockHttpSource::new();
        mock.expect_fetch_json()
            .withf(|url| url == AWS_URL)
            .returning(|_| Ok(json!({"prefixes": [{"ip_prefix": "0.0.0.0/0"}]})));
        mock.expect_fetch_json()
            .withf(|url| url == GCP_URL)
            .returning(|_| Ok(json!({"prefixes": [{"ipv4Prefix": "10.0.0.0/8"}]})));
        mock.expect_fetch_json()
            .withf(|url| url == AZURE_PINNED)
            .returning(|_| Ok(json!({"values": []})));

        let summary = run(&config, &mock, true).await.unwrap();
        assert_eq!(summary.address_count, (1u64 << 32) + (1u64 << 24));
    }

    #[tokio::test]
    async fn test_dry_run_leaves_file_untouched() {
        let dir = tempdir().unwrap();
        let out_file = dir.path().join("all.rsc");
        let config = test_config(out_file.clone(), Some(AZURE_PINNED));
        let mock = feeds_mock(AZURE_PINNED);

        let summary = run(&config, &mock, true).await.unwrap();
        assert!(summary.out_file.is_none());
        assert_eq!(summary.prefix_count, 4);
        assert!(!out_file.exists());
    }
}
