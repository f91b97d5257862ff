use serde::{Deserialize, Serialize};

/// Severity level for a finding, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        }
    }

    /// Lenient parse for tool-reported severities. Anything unrecognised
    /// (nuclei emits `unknown`) is treated as informational.
    pub fn from_tool(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" | "moderate" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Info,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The external capability that produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Port,
    Vuln,
    Web,
    #[serde(rename = "enum")]
    Enumeration,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Port => "port",
            Capability::Vuln => "vuln",
            Capability::Web => "web",
            Capability::Enumeration => "enum",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One normalized scan output unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub capability: Capability,
    pub severity: Severity,
    /// Template or check identifier (e.g. "CVE-2021-44228", "nuclei-finding").
    pub identifier: String,
    pub description: String,
    /// Host the finding was produced against.
    pub source_host: String,
    /// Location the tool reported as matched, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    Open,
    Filtered,
}

/// A port reported by the port prober.
///
/// Ordering and equality only consider `(port, protocol)` so a set of these
/// holds at most one entry per socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortFinding {
    pub port: u16,
    pub protocol: Protocol,
    pub state: PortState,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl PortFinding {
    pub fn is_open(&self) -> bool {
        self.state == PortState::Open
    }
}

impl PartialEq for PortFinding {
    fn eq(&self, other: &Self) -> bool {
        self.port == other.port && self.protocol == other.protocol
    }
}

impl Eq for PortFinding {}

impl PartialOrd for PortFinding {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PortFinding {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.port, self.protocol).cmp(&(other.port, other.protocol))
    }
}
