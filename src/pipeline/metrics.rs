use crate::models::{ScanSummary, TargetScanRecord};

/// Fold per-host records into one summary. Pure sums and bucket counts, so
/// the order of `hosts` never matters.
pub fn compute_summary(hosts: &[TargetScanRecord], discovered_host_count: usize) -> ScanSummary {
    let mut summary = ScanSummary {
        host_count: hosts.len(),
        discovered_host_count,
        ..Default::default()
    };

    for host in hosts {
        summary.open_port_count += host.open_port_count();
        summary.vulnerability_count += host.vulnerabilities.len();
        for finding in &host.vulnerabilities {
            *summary.severity_counts.entry(finding.severity).or_insert(0) += 1;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Capability, Finding, PortFinding, PortState, Protocol, Severity};
    use chrono::Utc;

    fn record(host: &str, open: &[u16], filtered: &[u16], severities: &[Severity]) -> TargetScanRecord {
        let ports = open
            .iter()
            .map(|p| (*p, PortState::Open))
            .chain(filtered.iter().map(|p| (*p, PortState::Filtered)))
            .map(|(port, state)| PortFinding {
                port,
                protocol: Protocol::Tcp,
                state,
                service: "svc".into(),
                version: None,
            })
            .collect();
        let vulnerabilities = severities
            .iter()
            .map(|s| Finding {
                capability: Capability::Vuln,
                severity: *s,
                identifier: "t".into(),
                description: "d".into(),
                source_host: host.into(),
                url: None,
            })
            .collect();
        TargetScanRecord {
            host: host.into(),
            ports,
            vulnerabilities,
            web_findings: Vec::new(),
            scanned_at: Utc::now(),
            duration_ms: 10,
        }
    }

    #[test]
    fn test_sums_open_ports_and_buckets_severity() {
        let hosts = vec![
            record("a", &[22, 443], &[161], &[Severity::Critical, Severity::Low]),
            record("b", &[80, 443], &[], &[Severity::Low, Severity::Info]),
        ];
        let summary = compute_summary(&hosts, 7);
        assert_eq!(summary.host_count, 2);
        assert_eq!(summary.discovered_host_count, 7);
        assert_eq!(summary.open_port_count, 4);
        assert_eq!(summary.vulnerability_count, 4);
        assert_eq!(summary.count(Severity::Critical), 1);
        assert_eq!(summary.count(Severity::Low), 2);
        assert_eq!(summary.count(Severity::Info), 1);
        assert!(!summary.severity_counts.contains_key(&Severity::High));
    }

    #[test]
    fn test_order_independent() {
        let a = record("a", &[22], &[], &[Severity::High]);
        let b = record("b", &[80, 443], &[], &[Severity::Medium, Severity::Medium]);
        let c = record("c", &[], &[], &[]);
        let forward = compute_summary(&[a.clone(), b.clone(), c.clone()], 3);
        let reversed = compute_summary(&[c, b, a], 3);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_empty_run() {
        let summary = compute_summary(&[], 1);
        assert_eq!(summary.host_count, 0);
        assert!(summary.severity_counts.is_empty());
    }
}
