use std::path::Path;
use crate::errors::DeepScanError;
use super::types::DeepScanConfig;
use super::schema::CONFIG_SCHEMA;
use super::settings::{DEFAULT_WEB_MAX_TIME_SECS, DEFAULT_WEB_TIMEOUT_SECS};
use tracing::warn;

pub async fn parse_config(path: &Path) -> Result<DeepScanConfig, DeepScanError> {
    if !path.exists() {
        return Err(DeepScanError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > 1_048_576 {
        return Err(DeepScanError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

/// Parse an in-memory YAML document through the same checks as `parse_config`.
pub fn parse_config_str(content: &str) -> Result<DeepScanConfig, DeepScanError> {
    if content.trim().is_empty() {
        return Ok(DeepScanConfig::default());
    }

    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;

    validate_schema(&yaml)?;

    let config: DeepScanConfig = serde_yaml::from_value(yaml)?;

    validate_conflicts(&config)?;

    Ok(config)
}

/// Validate config against the JSON schema for structural correctness.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), DeepScanError> {
    let json_str = serde_json::to_string(yaml)
        .map_err(|e| DeepScanError::Config(format!("Config conversion error: {}", e)))?;
    let json_value: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|e| DeepScanError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| DeepScanError::Config(format!("Schema compilation error: {}", e)))?;

    let result = compiled.validate(&json_value);
    if let Err(errors) = result {
        let messages: Vec<String> = errors
            .map(|e| format!("{} at {}", e, e.instance_path))
            .collect();
        // Advisory only; typed deserialization is the hard gate.
        for msg in &messages {
            warn!(validation_error = %msg, "Config schema warning");
        }
    }

    Ok(())
}

/// Detect semantic conflicts in the parsed configuration.
fn validate_conflicts(config: &DeepScanConfig) -> Result<(), DeepScanError> {
    if let Some(scan) = &config.scan {
        if scan.max_hosts == Some(0) {
            return Err(DeepScanError::Config("scan.max_hosts must be at least 1".into()));
        }
        if scan.output_limit_bytes == Some(0) {
            return Err(DeepScanError::Config("scan.output_limit_bytes must be positive".into()));
        }
    }

    if let Some(tools) = &config.tools {
        let named = [
            ("enumerator", &tools.enumerator),
            ("port_prober", &tools.port_prober),
            ("vuln_matcher", &tools.vuln_matcher),
            ("web_fingerprinter", &tools.web_fingerprinter),
        ];
        for (name, tool) in named {
            let Some(tool) = tool else { continue };
            if tool.timeout_secs == Some(0) {
                return Err(DeepScanError::Config(format!(
                    "tools.{}.timeout_secs must be positive",
                    name
                )));
            }
            if tool.program.as_deref().is_some_and(|p| p.trim().is_empty()) {
                return Err(DeepScanError::Config(format!("tools.{}.program is empty", name)));
            }
        }

        // Compared after defaulting, so setting only one side is still checked.
        if let Some(web) = &tools.web_fingerprinter {
            let max_time = web.max_time_secs.unwrap_or(DEFAULT_WEB_MAX_TIME_SECS);
            let timeout = web.timeout_secs.unwrap_or(DEFAULT_WEB_TIMEOUT_SECS);
            if max_time >= timeout {
                return Err(DeepScanError::Config(format!(
                    "tools.web_fingerprinter.max_time_secs ({}) must be below timeout_secs ({})",
                    max_time, timeout
                )));
            }
        }
    }

    if let Some(notifications) = &config.notifications {
        if let Some(threshold) = notifications.alert_score_threshold {
            if threshold > 100 {
                return Err(DeepScanError::Config(format!(
                    "notifications.alert_score_threshold ({}) exceeds 100",
                    threshold
                )));
            }
        }
        if notifications.timeout_secs == Some(0) {
            return Err(DeepScanError::Config("notifications.timeout_secs must be positive".into()));
        }
    }

    if let Some(jobs) = &config.jobs {
        if jobs.cleanup_interval_secs == Some(0) {
            warn!("jobs.cleanup_interval_secs is 0, finished jobs will never be evicted");
        }
    }

    Ok(())
}
