//! CLI argument parsing with clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{parse_timeout, Config};
use crate::error::ExportError;

#[derive(Parser, Debug)]
#[command(name = "cloud-ipv4")]
#[command(
    author,
    version,
    about = "Merge AWS, GCP and Azure IPv4 ranges into a RouterOS address-list script",
    long_about = "Fetches the published IPv4 ranges of AWS, Google Cloud and Azure, merges them \
                  into one deduplicated list and writes a RouterOS script that replaces the \
                  \"CloudAll\" firewall address-list.\n\n\
                  Environment: HTTP_TIMEOUT, OUT_FILE, AWS_URL, GCP_URL, AZURE_URL. \
                  Command-line options take precedence."
)]
pub struct Cli {
    /// Output script path (overrides OUT_FILE)
    #[arg(short, long)]
    pub out_file: Option<PathBuf>,

    /// Per-request HTTP timeout in seconds (overrides HTTP_TIMEOUT)
    #[arg(short, long)]
    pub timeout: Option<String>,

    /// Pinned Azure ServiceTags_Public_*.json URL (overrides AZURE_URL)
    #[arg(long)]
    pub azure_url: Option<String>,

    /// Print the script to stdout instead of writing the output file
    #[arg(long)]
    pub dry_run: bool,

    /// Quiet mode (errors only, for cron/systemd timers)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the environment configuration
    pub fn apply(&self, config: &mut Config) -> Result<(), ExportError> {
        if let Some(ref out_file) = self.out_file {
            config.out_file = out_file.clone();
        }
        if let Some(ref raw) = self.timeout {
            config.http_timeout = parse_timeout(raw)?;
        }
        if let Some(ref url) = self.azure_url {
            let url = url.trim();
            config.azure_url = (!url.is_empty()).then(|| url.to_string());
        }
        Ok(())
    }
}
