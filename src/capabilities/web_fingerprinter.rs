use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::ToolSettings;
use crate::parsers::parse_web_findings;
use crate::process::{CommandRunner, CommandSpec};
use super::https_url;

/// Web server fingerprinting via nikto. nikto gets its own `-maxtime`
/// below the runner timeout so it can finish its report on its own.
pub struct WebFingerprinter {
    runner: Arc<dyn CommandRunner>,
    tool: ToolSettings,
    max_time: Duration,
}

impl WebFingerprinter {
    pub fn new(runner: Arc<dyn CommandRunner>, tool: ToolSettings, max_time: Duration) -> Self {
        Self { runner, tool, max_time }
    }

    pub fn command(&self, host: &str) -> CommandSpec {
        CommandSpec::new(
            &self.tool.program,
            [
                "-host".to_string(),
                https_url(host),
                "-maxtime".to_string(),
                format!("{}s", self.max_time.as_secs()),
            ],
        )
    }

    pub async fn fingerprint(&self, host: &str) -> Vec<String> {
        info!(host = %host, "Fingerprinting web server");
        let result = self.runner.execute(&self.command(host), self.tool.timeout).await;
        let findings = parse_web_findings(&result.output);
        info!(
            host = %host,
            completed = result.completed,
            output_bytes = result.output.len(),
            count = findings.len(),
            "Web fingerprint finished"
        );
        findings
    }
}
