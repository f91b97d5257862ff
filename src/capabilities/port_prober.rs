use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use crate::config::ToolSettings;
use crate::models::PortFinding;
use crate::parsers::parse_ports;
use crate::process::{CommandRunner, CommandSpec};

/// Port and service probing via nmap.
pub struct PortProber {
    runner: Arc<dyn CommandRunner>,
    tool: ToolSettings,
}

impl PortProber {
    pub fn new(runner: Arc<dyn CommandRunner>, tool: ToolSettings) -> Self {
        Self { runner, tool }
    }

    pub fn command(&self, host: &str) -> CommandSpec {
        CommandSpec::new(&self.tool.program, ["-A", "-Pn", host])
    }

    pub async fn probe(&self, host: &str) -> BTreeSet<PortFinding> {
        info!(host = %host, "Probing ports");
        let result = self.runner.execute(&self.command(host), self.tool.timeout).await;
        let ports = parse_ports(&result.output);
        info!(
            host = %host,
            completed = result.completed,
            output_bytes = result.output.len(),
            count = ports.len(),
            "Port probe finished"
        );
        ports
    }
}
