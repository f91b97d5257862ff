use serde::{Deserialize, Serialize};

/// On-disk configuration. Every section is optional; `ScanSettings::resolve`
/// fills in defaults.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DeepScanConfig {
    pub scan: Option<ScanConfig>,
    pub tools: Option<ToolsConfig>,
    pub jobs: Option<JobsConfig>,
    pub notifications: Option<NotificationConfig>,
    pub server: Option<ServerConfig>,
    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ScanConfig {
    pub max_hosts: Option<usize>,
    pub stage_pause_ms: Option<u64>,
    pub kill_grace_ms: Option<u64>,
    pub output_limit_bytes: Option<usize>,
    pub extra_path: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ToolsConfig {
    pub enumerator: Option<ToolConfig>,
    pub port_prober: Option<ToolConfig>,
    pub vuln_matcher: Option<ToolConfig>,
    pub web_fingerprinter: Option<ToolConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ToolConfig {
    pub program: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Tool-side time budget, only honoured by the web fingerprinter.
    pub max_time_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct JobsConfig {
    pub retention_secs: Option<u64>,
    pub cleanup_interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct NotificationConfig {
    pub webhook_url: Option<String>,
    pub alert_score_threshold: Option<u8>,
    /// Upper bound on one alert delivery.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StorageConfig {
    pub path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_is_empty() {
        let config = DeepScanConfig::default();
        assert!(config.scan.is_none());
        assert!(config.tools.is_none());
        assert!(config.notifications.is_none());
    }

    #[test]
    fn test_partial_yaml_deserializes() {
        let yaml = "tools:\n  port_prober:\n    program: /opt/nmap/bin/nmap\n";
        let config: DeepScanConfig = serde_yaml::from_str(yaml).unwrap();
        let prober = config.tools.unwrap().port_prober.unwrap();
        assert_eq!(prober.program.as_deref(), Some("/opt/nmap/bin/nmap"));
        assert!(prober.timeout_secs.is_none());
    }
}
