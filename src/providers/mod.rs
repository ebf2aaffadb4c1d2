//! Provider extractors (AWS, GCP, Azure).
//!
//! Each extractor turns one provider's JSON schema into a flat, ordered
//! list of IPv4 CIDR strings. Prefixes are opaque tokens: no parsing or
//! validation happens here. Missing optional fields yield nothing.

pub mod aws;
pub mod azure;
pub mod gcp;

use std::fmt;

/// A cloud provider feed, in merge precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Aws,
    Gcp,
    Azure,
}

impl Provider {
    /// All providers in merge order. Earlier providers win duplicates.
    pub const ALL: [Provider; 3] = [Provider::Aws, Provider::Gcp, Provider::Azure];

    /// Short lowercase label used in logs and the script header
    pub fn label(&self) -> &'static str {
        match self {
            Provider::Aws => "aws",
            Provider::Gcp => "gcp",
            Provider::Azure => "azure",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Prefixes extracted from one provider feed, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPrefixes {
    pub provider: Provider,
    pub prefixes: Vec<String>,
}

impl ProviderPrefixes {
    pub fn new(provider: Provider, prefixes: Vec<String>) -> Self {
        Self { provider, prefixes }
    }
}

/// Comma-separated provider labels, e.g. `aws,gcp,azure`
pub fn provider_list() -> String {
    Provider::ALL
        .iter()
        .map(|p| p.label())
        .collect::<Vec<_>>()
        .join(",")
}
