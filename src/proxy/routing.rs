//! Longest-prefix route matching and path rewriting.
//!
//! The [`RouteTable`] is built once from the loaded [`Config`] and never
//! mutated. Each entry pairs a full match prefix (gateway prefix + route
//! path) with the gateway prefix to strip and the upstream base URL.
//! Entries are kept sorted by prefix length, longest first, so the first
//! segment-aligned match is also the most specific one. Ties keep config
//! order.

use std::time::Duration;

use crate::config::model::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    /// Full inbound prefix, without trailing slash (`""` matches everything).
    pub prefix: String,
    /// Gateway-level prefix removed before forwarding.
    pub strip: String,
    /// Upstream base URL, without trailing slash.
    pub base_url: String,
    pub timeout: Duration,
}

/// A resolved route plus the rewritten upstream URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    pub upstream_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let strip = normalize(&config.gateway.prefix).to_string();
        let entries = config
            .routes
            .iter()
            .map(|route| RouteEntry {
                prefix: format!("{strip}{}", normalize(&route.path)),
                strip: strip.clone(),
                base_url: route.url.trim_end_matches('/').to_string(),
                timeout: Duration::from_millis(route.timeout.unwrap_or(config.gateway.timeout)),
            })
            .collect();
        Self::new(entries)
    }

    #[must_use]
    pub fn new(mut entries: Vec<RouteEntry>) -> Self {
        // Stable sort: equal-length prefixes keep their configured order
        entries.sort_by_key(|e| std::cmp::Reverse(e.prefix.len()));
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the most specific entry for `path` and build the upstream URL.
    ///
    /// `query` is appended unchanged when present.
    #[must_use]
    pub fn resolve(&self, path: &str, query: Option<&str>) -> Option<RouteMatch<'_>> {
        let entry = self
            .entries
            .iter()
            .find(|e| segment_prefix(path, &e.prefix))?;

        let mut remainder = &path[entry.strip.len()..];
        if remainder.is_empty() {
            remainder = "/";
        }

        let mut upstream_url = format!("{}{remainder}", entry.base_url);
        if let Some(q) = query {
            upstream_url.push('?');
            upstream_url.push_str(q);
        }

        Some(RouteMatch {
            entry,
            upstream_url,
        })
    }
}

fn normalize(prefix: &str) -> &str {
    prefix.trim_end_matches('/')
}

/// `prefix` matches `path` only on a segment boundary: `/api` matches
/// `/api` and `/api/x` but not `/apix`.
fn segment_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
