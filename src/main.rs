//! cloud-ipv4 - cloud provider IPv4 ranges as a RouterOS address-list.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cloud_ipv4::cli::Cli;
use cloud_ipv4::config::Config;
use cloud_ipv4::fetcher::Fetcher;
use cloud_ipv4::pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    // stdout is reserved for the summary (or the script in dry-run mode)
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = Config::from_env()?;
    cli.apply(&mut config)?;
    config.validate()?;

    info!("Exporting cloud IPv4 ranges (timeout {:?})", config.http_timeout);

    let fetcher = Fetcher::new(config.http_timeout)?;
    let summary = pipeline::run(&config, &fetcher, cli.dry_run).await?;

    let counts: Vec<String> = summary
        .sources
        .iter()
        .map(|(provider, count)| format!("{}={}", provider, count))
        .collect();
    info!("Source prefixes: {}", counts.join(", "));

    if let Some(ref path) = summary.out_file {
        println!(
            "Wrote {} with {} prefixes.",
            path.display(),
            summary.prefix_count
        );
    }

    Ok(())
}
