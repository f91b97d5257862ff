use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::finding::{Finding, PortFinding};

/// A dotted DNS name. Also used unanchored to pull hostnames out of tool output.
pub(crate) const HOSTNAME_PATTERN: &str =
    r"(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z0-9][a-z0-9-]{0,61}[a-z0-9]";

static EXACT_HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("(?i)^{}$", HOSTNAME_PATTERN)).expect("valid hostname pattern")
});

/// The domain a run resolves a subject to, and the hosts enumeration found for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub domain: String,
    pub resolved_hosts: Vec<String>,
}

impl Target {
    /// Resolve a subject URL to its bare domain: scheme, path, port and
    /// case are discarded. Returns `None` unless what remains is a hostname
    /// or IPv4 address, so the result is always safe to pass as a tool argument.
    pub fn domain_from_url(url: &str) -> Option<String> {
        let trimmed = url.trim();
        let after_scheme = match trimmed.split_once("://") {
            Some((_, rest)) => rest,
            None => trimmed,
        };
        let host_port = after_scheme
            .split(['/', '?', '#'])
            .next()
            .unwrap_or(after_scheme);
        let host_port = host_port.rsplit('@').next().unwrap_or(host_port);
        let host = host_port.split(':').next().unwrap_or(host_port);
        let host = host.trim_end_matches('.').to_ascii_lowercase();

        if Self::is_valid_host(&host) {
            Some(host)
        } else {
            None
        }
    }

    /// Whole-string hostname or IPv4 match. Never starts with `-`.
    pub fn is_valid_host(host: &str) -> bool {
        host.len() <= 253 && (EXACT_HOSTNAME.is_match(host) || host.parse::<Ipv4Addr>().is_ok())
    }
}

/// Everything the three post-enumeration capabilities produced for one host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetScanRecord {
    pub host: String,
    pub ports: BTreeSet<PortFinding>,
    pub vulnerabilities: Vec<Finding>,
    pub web_findings: Vec<String>,
    pub scanned_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl TargetScanRecord {
    pub fn open_port_count(&self) -> usize {
        self.ports.iter().filter(|p| p.is_open()).count()
    }
}
