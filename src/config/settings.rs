use std::path::PathBuf;
use std::time::Duration;

use super::types::{DeepScanConfig, ToolConfig};

pub const DEFAULT_MAX_HOSTS: usize = 5;
pub const DEFAULT_STAGE_PAUSE_MS: u64 = 2_000;
pub const DEFAULT_KILL_GRACE_MS: u64 = 5_000;
pub const DEFAULT_OUTPUT_LIMIT_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_ALERT_SCORE_THRESHOLD: u8 = 50;
pub const DEFAULT_JOB_RETENTION_SECS: u64 = 3_600;
pub const DEFAULT_JOB_CLEANUP_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_WEB_MAX_TIME_SECS: u64 = 180;
pub const DEFAULT_WEB_TIMEOUT_SECS: u64 = 240;
pub const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

/// Program and time budget for one capability.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    pub program: String,
    pub timeout: Duration,
}

impl ToolSettings {
    fn resolve(config: Option<&ToolConfig>, program: &str, timeout_secs: u64) -> Self {
        Self {
            program: config
                .and_then(|c| c.program.clone())
                .unwrap_or_else(|| program.to_string()),
            timeout: Duration::from_secs(
                config.and_then(|c| c.timeout_secs).unwrap_or(timeout_secs),
            ),
        }
    }
}

/// Fully defaulted runtime settings for the scan pipeline.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub max_hosts: usize,
    pub stage_pause: Duration,
    pub kill_grace: Duration,
    pub output_limit_bytes: usize,
    pub extra_path: Vec<PathBuf>,
    pub enumerator: ToolSettings,
    pub port_prober: ToolSettings,
    pub vuln_matcher: ToolSettings,
    pub web_fingerprinter: ToolSettings,
    /// Passed to the web fingerprinter as its own `-maxtime`.
    pub web_max_time: Duration,
    pub alert_score_threshold: u8,
    pub webhook_url: Option<String>,
    pub notify_timeout: Duration,
}

impl ScanSettings {
    pub fn resolve(config: &DeepScanConfig) -> Self {
        let scan = config.scan.clone().unwrap_or_default();
        let tools = config.tools.clone().unwrap_or_default();
        let notifications = config.notifications.clone().unwrap_or_default();

        let extra_path = match scan.extra_path {
            Some(entries) => entries.iter().map(|e| expand_home(e)).collect(),
            None => default_extra_path(),
        };

        Self {
            max_hosts: scan.max_hosts.unwrap_or(DEFAULT_MAX_HOSTS),
            stage_pause: Duration::from_millis(scan.stage_pause_ms.unwrap_or(DEFAULT_STAGE_PAUSE_MS)),
            kill_grace: Duration::from_millis(scan.kill_grace_ms.unwrap_or(DEFAULT_KILL_GRACE_MS)),
            output_limit_bytes: scan.output_limit_bytes.unwrap_or(DEFAULT_OUTPUT_LIMIT_BYTES),
            extra_path,
            enumerator: ToolSettings::resolve(tools.enumerator.as_ref(), "sublist3r", DEFAULT_TOOL_TIMEOUT_SECS),
            port_prober: ToolSettings::resolve(tools.port_prober.as_ref(), "nmap", DEFAULT_TOOL_TIMEOUT_SECS),
            vuln_matcher: ToolSettings::resolve(tools.vuln_matcher.as_ref(), "nuclei", DEFAULT_TOOL_TIMEOUT_SECS),
            web_fingerprinter: ToolSettings::resolve(
                tools.web_fingerprinter.as_ref(),
                "nikto",
                DEFAULT_WEB_TIMEOUT_SECS,
            ),
            web_max_time: Duration::from_secs(
                tools
                    .web_fingerprinter
                    .as_ref()
                    .and_then(|t| t.max_time_secs)
                    .unwrap_or(DEFAULT_WEB_MAX_TIME_SECS),
            ),
            alert_score_threshold: notifications
                .alert_score_threshold
                .unwrap_or(DEFAULT_ALERT_SCORE_THRESHOLD),
            webhook_url: notifications.webhook_url.filter(|u| !u.trim().is_empty()),
            notify_timeout: Duration::from_secs(
                notifications.timeout_secs.unwrap_or(DEFAULT_NOTIFY_TIMEOUT_SECS),
            ),
        }
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self::resolve(&DeepScanConfig::default())
    }
}

/// Job registry housekeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSettings {
    pub retention: Duration,
    pub cleanup_interval: Duration,
}

impl JobSettings {
    pub fn resolve(config: &DeepScanConfig) -> Self {
        let jobs = config.jobs.clone().unwrap_or_default();
        Self {
            retention: Duration::from_secs(jobs.retention_secs.unwrap_or(DEFAULT_JOB_RETENTION_SECS)),
            cleanup_interval: Duration::from_secs(
                jobs.cleanup_interval_secs.unwrap_or(DEFAULT_JOB_CLEANUP_INTERVAL_SECS),
            ),
        }
    }
}

fn default_extra_path() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(home) = std::env::var("HOME") {
        dirs.push(PathBuf::from(home).join("go").join("bin"));
    }
    dirs.push(PathBuf::from("/usr/local/bin"));
    dirs
}

fn expand_home(entry: &str) -> PathBuf {
    let rest = entry
        .strip_prefix("$HOME")
        .or_else(|| entry.strip_prefix('~'));
    match (rest, std::env::var("HOME")) {
        (Some(rest), Ok(home)) => PathBuf::from(format!("{}{}", home, rest)),
        _ => PathBuf::from(entry),
    }
}
