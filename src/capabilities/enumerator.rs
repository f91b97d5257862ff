use std::sync::Arc;

use tracing::info;

use crate::config::ToolSettings;
use crate::parsers::parse_subdomains;
use crate::process::{CommandRunner, CommandSpec};

/// Subdomain discovery via sublist3r.
pub struct Enumerator {
    runner: Arc<dyn CommandRunner>,
    tool: ToolSettings,
}

impl Enumerator {
    pub fn new(runner: Arc<dyn CommandRunner>, tool: ToolSettings) -> Self {
        Self { runner, tool }
    }

    pub fn command(&self, domain: &str) -> CommandSpec {
        CommandSpec::new(&self.tool.program, ["-d", domain, "-n"])
    }

    /// Hosts under `domain`, never empty.
    pub async fn enumerate(&self, domain: &str) -> Vec<String> {
        info!(domain = %domain, "Enumerating subdomains");
        let result = self.runner.execute(&self.command(domain), self.tool.timeout).await;
        let hosts = parse_subdomains(&result.output, domain);
        info!(
            domain = %domain,
            completed = result.completed,
            output_bytes = result.output.len(),
            count = hosts.len(),
            "Enumeration finished"
        );
        hosts
    }
}
