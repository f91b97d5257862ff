use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::info;

use crate::capabilities::Capabilities;
use crate::models::TargetScanRecord;

/// Runs the three post-enumeration capabilities against one host, one at a
/// time, with a pause between stages. A stage's failure never stops the
/// next one.
pub struct TargetScanner {
    capabilities: Arc<Capabilities>,
    stage_pause: Duration,
}

impl TargetScanner {
    pub fn new(capabilities: Arc<Capabilities>, stage_pause: Duration) -> Self {
        Self { capabilities, stage_pause }
    }

    pub async fn scan(&self, host: &str) -> TargetScanRecord {
        let started = Instant::now();
        info!(host = %host, "Scanning host");

        let ports = self.capabilities.port_prober.probe(host).await;
        self.pause().await;
        let vulnerabilities = self.capabilities.vuln_matcher.scan(host).await;
        self.pause().await;
        let web_findings = self.capabilities.web_fingerprinter.fingerprint(host).await;

        let duration_ms = started.elapsed().as_millis() as u64;
        info!(
            host = %host,
            ports = ports.len(),
            vulns = vulnerabilities.len(),
            web = web_findings.len(),
            duration_ms,
            "Host scan complete"
        );

        TargetScanRecord {
            host: host.to_string(),
            ports,
            vulnerabilities,
            web_findings,
            scanned_at: Utc::now(),
            duration_ms,
        }
    }

    async fn pause(&self) {
        if !self.stage_pause.is_zero() {
            tokio::time::sleep(self.stage_pause).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::testing::ScriptedRunner;
    use crate::config::ScanSettings;

    #[tokio::test]
    async fn test_stages_run_in_fixed_order() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .reply("nmap", "80/tcp open http\n", true)
                .reply("nikto", "+ Server: nginx\n", true),
        );
        let caps = Arc::new(Capabilities::new(runner.clone(), &ScanSettings::default()));
        let scanner = TargetScanner::new(caps, Duration::ZERO);

        let record = scanner.scan("www.example.com").await;
        assert_eq!(record.host, "www.example.com");
        assert_eq!(record.open_port_count(), 1);
        assert!(record.vulnerabilities.is_empty());
        assert_eq!(record.web_findings, vec!["+ Server: nginx"]);

        let programs: Vec<String> = runner
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|(spec, _)| spec.program.clone())
            .collect();
        assert_eq!(programs, vec!["nmap", "nuclei", "nikto"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pauses_between_stages() {
        let runner = Arc::new(ScriptedRunner::new());
        let caps = Arc::new(Capabilities::new(runner, &ScanSettings::default()));
        let scanner = TargetScanner::new(caps, Duration::from_secs(2));

        let started = tokio::time::Instant::now();
        scanner.scan("h.example.com").await;
        assert!(started.elapsed() >= Duration::from_secs(4));
    }
}
