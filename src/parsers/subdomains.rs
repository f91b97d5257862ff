use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::target::HOSTNAME_PATTERN;
use super::strip_ansi;

static HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("(?i){}", HOSTNAME_PATTERN)).expect("valid hostname pattern")
});

/// Extract hostnames under `domain` from enumerator output.
///
/// Keeps `domain` itself and anything ending in `.domain`, lowercased and
/// deduplicated in first-seen order. Falls back to `[domain]` when nothing
/// matches, so the pipeline always has at least one host.
pub fn parse_subdomains(output: &str, domain: &str) -> Vec<String> {
    let domain = domain.trim().trim_end_matches('.').to_ascii_lowercase();
    let suffix = format!(".{}", domain);
    let text = strip_ansi(output);

    let mut seen = HashSet::new();
    let mut hosts = Vec::new();
    for m in HOSTNAME.find_iter(&text) {
        let candidate = m.as_str().to_ascii_lowercase();
        if (candidate == domain || candidate.ends_with(&suffix)) && seen.insert(candidate.clone()) {
            hosts.push(candidate);
        }
    }

    if hosts.is_empty() {
        hosts.push(domain);
    }
    hosts
}
