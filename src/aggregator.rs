//! Merging of provider prefix lists.
//!
//! Prefixes are compared as exact strings. No CIDR semantics apply to the
//! merge: `10.0.0.0/24` and `10.0.0.0/24 ` are different entries.

use ipnet::Ipv4Net;
use std::collections::HashSet;

use crate::providers::ProviderPrefixes;

/// Deduplicate while keeping the first occurrence of every string, in order.
pub fn dedupe_keep_order(items: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(items.len());
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if seen.insert(item.as_str()) {
            out.push(item.clone());
        }
    }
    out
}

/// Concatenate provider lists in the order given and deduplicate.
///
/// Callers pass lists in AWS, GCP, Azure order; a prefix published by
/// several providers stays at the position of its first occurrence.
pub fn merge(lists: &[ProviderPrefixes]) -> Vec<String> {
    let all: Vec<String> = lists
        .iter()
        .flat_map(|list| list.prefixes.iter().cloned())
        .collect();
    dedupe_keep_order(&all)
}

/// Count the IPv4 addresses covered by a list of prefixes.
///
/// Informational only: overlapping prefixes are counted twice and entries
/// that do not parse as IPv4 CIDR are ignored.
pub fn count_addresses(prefixes: &[String]) -> u64 {
    prefixes
        .iter()
        .filter_map(|p| p.parse::<Ipv4Net>().ok())
        .map(|net| 1u64 << (32 - u32::from(net.prefix_len())))
        .fold(0u64, |acc, count| acc.saturating_add(count))
}
