use std::sync::Arc;

use tracing::info;

use crate::config::ToolSettings;
use crate::models::Finding;
use crate::parsers::parse_vulnerabilities;
use crate::process::{CommandRunner, CommandSpec};
use super::https_url;

/// Vulnerability template matching via nuclei.
pub struct VulnMatcher {
    runner: Arc<dyn CommandRunner>,
    tool: ToolSettings,
}

impl VulnMatcher {
    pub fn new(runner: Arc<dyn CommandRunner>, tool: ToolSettings) -> Self {
        Self { runner, tool }
    }

    pub fn command(&self, host: &str) -> CommandSpec {
        CommandSpec::new(&self.tool.program, ["-target".to_string(), https_url(host), "-jsonl".to_string()])
    }

    pub async fn scan(&self, host: &str) -> Vec<Finding> {
        info!(host = %host, "Matching vulnerability templates");
        let result = self.runner.execute(&self.command(host), self.tool.timeout).await;
        let findings = parse_vulnerabilities(&result.output, host);
        info!(
            host = %host,
            completed = result.completed,
            output_bytes = result.output.len(),
            count = findings.len(),
            "Vulnerability scan finished"
        );
        findings
    }
}
