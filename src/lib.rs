//! # cloud-ipv4 - Cloud Provider IPv4 Ranges for RouterOS
//!
//! A batch job that aggregates the IPv4 ranges published by AWS, Google
//! Cloud and Azure into one deduplicated list, then writes a RouterOS
//! script replacing the `CloudAll` firewall address-list.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        cloud-ipv4                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap) + Config (environment)                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Fetcher (reqwest + rustls, HttpSource trait)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Providers                                                  │
//! │    ├── AWS    ip-ranges.json  prefixes[].ip_prefix          │
//! │    ├── GCP    goog.json       prefixes[].ipv4Prefix         │
//! │    └── Azure  ServiceTags     values[].properties...        │
//! │          └── Discovery (pinned URL or confirmation pages)   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Aggregator - order-preserving exact-string dedupe          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RouterOS emitter - atomic write of the .rsc script         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use cloud_ipv4::config::Config;
//! use cloud_ipv4::fetcher::Fetcher;
//! use cloud_ipv4::pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     config.validate()?;
//!
//!     let fetcher = Fetcher::new(config.http_timeout)?;
//!     let summary = pipeline::run(&config, &fetcher, false).await?;
//!     println!("{} prefixes", summary.prefix_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Failure model
//!
//! Every error is fatal. A run either writes the complete script or
//! writes nothing; re-running is the recovery mechanism.
//!
//! ## Modules
//!
//! - [`aggregator`] - Order-preserving merge of provider lists
//! - [`cli`] - Command-line interface definitions
//! - [`config`] - Configuration from the environment
//! - [`discovery`] - Azure Service Tags URL resolution
//! - [`error`] - Pipeline error types
//! - [`fetcher`] - HTTP client for feeds and pages
//! - [`pipeline`] - Fetch, merge and emit
//! - [`providers`] - Per-provider JSON extractors
//! - [`routeros`] - Script rendering and writing
//! - [`utils`] - Formatting helpers

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fetcher;
pub mod pipeline;
pub mod providers;
pub mod routeros;
pub mod utils;

pub use config::Config;
pub use error::ExportError;
