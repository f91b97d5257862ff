use crate::models::{ScanReport, Subject};
use crate::utils::formatting::format_duration;
use super::formatter::{format_executive_summary, format_host_section};

/// Render the latest report for `subject` as Markdown, with a history table
/// built from `history` (newest first, the latest report excluded).
pub fn render_markdown(subject: &Subject, latest: &ScanReport, history: &[ScanReport]) -> String {
    let mut out = String::new();

    out.push_str("# Security Audit Report\n\n");
    out.push_str(&format!("**Target:** {}\n", subject.name));
    out.push_str(&format!("**URL:** {}\n", subject.url));
    out.push_str(&format!("**Domain:** {}\n", latest.domain));
    out.push_str(&format!("**Generated:** {}\n", latest.generated_at.to_rfc3339()));
    out.push_str(&format!("**Scan duration:** {}\n\n", format_duration(latest.duration_ms)));

    out.push_str(&format_executive_summary(&latest.summary, latest.score));
    out.push_str("\n---\n\n");

    out.push_str("## Subdomain Enumeration\n\n");
    out.push_str(&format!(
        "{} discovered, {} scanned.\n\n",
        latest.discovered_hosts.len(),
        latest.hosts.len()
    ));
    for host in &latest.discovered_hosts {
        let marker = if latest.hosts.iter().any(|r| &r.host == host) { "scanned" } else { "not scanned" };
        out.push_str(&format!("- {} ({})\n", host, marker));
    }
    out.push_str("\n---\n\n");

    out.push_str("## Host Results\n\n");
    for record in &latest.hosts {
        out.push_str(&format_host_section(record));
    }

    if !history.is_empty() {
        out.push_str("---\n\n## Scan History\n\n| Date | Score | Hosts | Open ports | Vulnerabilities |\n|---|---|---|---|---|\n");
        for past in history {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                past.generated_at.format("%Y-%m-%d %H:%M"),
                past.score,
                past.summary.host_count,
                past.summary.open_port_count,
                past.summary.vulnerability_count,
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::*;
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn subject() -> Subject {
        Subject {
            id: "s1".into(),
            name: "Example".into(),
            url: "https://example.com".into(),
            owner_email: None,
            status: SubjectStatus::Scanned,
            progress: None,
            last_scan_at: None,
            created_at: Utc::now(),
        }
    }

    fn report(score: u8) -> ScanReport {
        let mut ports = BTreeSet::new();
        ports.insert(PortFinding {
            port: 22,
            protocol: Protocol::Tcp,
            state: PortState::Open,
            service: "ssh".into(),
            version: None,
        });
        ScanReport {
            id: "r".into(),
            subject_id: "s1".into(),
            domain: "example.com".into(),
            discovered_hosts: vec!["example.com".into(), "dev.example.com".into()],
            hosts: vec![TargetScanRecord {
                host: "example.com".into(),
                ports,
                vulnerabilities: vec![],
                web_findings: vec!["+ Server: nginx".into()],
                scanned_at: Utc::now(),
                duration_ms: 10,
            }],
            summary: ScanSummary { host_count: 1, discovered_host_count: 2, open_port_count: 1, ..Default::default() },
            score,
            generated_at: Utc::now(),
            duration_ms: 125_000,
        }
    }

    #[test]
    fn test_renders_sections() {
        let md = render_markdown(&subject(), &report(100), &[]);
        assert!(md.starts_with("# Security Audit Report"));
        assert!(md.contains("**Scan duration:** 2m 5s"));
        assert!(md.contains("100/100 (Low Risk)"));
        assert!(md.contains("- dev.example.com (not scanned)"));
        assert!(md.contains("| 22/tcp | open | ssh | - |"));
        assert!(md.contains("+ Server: nginx"));
        assert!(!md.contains("Scan History"));
    }

    #[test]
    fn test_history_table() {
        let md = render_markdown(&subject(), &report(90), &[report(60), report(40)]);
        assert!(md.contains("## Scan History"));
        assert_eq!(md.matches("| 1 | 1 | 0 |").count(), 2);
    }
}
