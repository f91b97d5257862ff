use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{PortFinding, PortState, Protocol};
use super::strip_ansi;

static PORT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)/(tcp|udp)\s+(open|filtered)\s+(\S+)\s*(.*)$").expect("valid port line pattern")
});

/// Parse nmap's normal output into port records. Closed ports, script
/// output and anything else that isn't a port table row is ignored.
pub fn parse_ports(output: &str) -> BTreeSet<PortFinding> {
    let text = strip_ansi(output);
    let mut ports = BTreeSet::new();

    for line in text.lines() {
        let Some(caps) = PORT_LINE.captures(line.trim()) else {
            continue;
        };
        let Ok(port) = caps[1].parse::<u16>() else {
            continue;
        };
        let protocol = match &caps[2] {
            "udp" => Protocol::Udp,
            _ => Protocol::Tcp,
        };
        let state = match &caps[3] {
            "filtered" => PortState::Filtered,
            _ => PortState::Open,
        };
        let version = caps
            .get(5)
            .map(|m| m.as_str().trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        ports.insert(PortFinding {
            port,
            protocol,
            state,
            service: caps[4].to_string(),
            version,
        });
    }

    ports
}
