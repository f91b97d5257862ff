use crate::models::{Finding, ScanSummary, Severity, TargetScanRecord};
use crate::pipeline::RiskLevel;

pub fn format_finding_markdown(finding: &Finding) -> String {
    let mut out = format!(
        "- **[{}]** `{}` {}",
        finding.severity.as_str().to_uppercase(),
        finding.identifier,
        finding.description,
    );
    if let Some(url) = &finding.url {
        out.push_str(&format!(" ({})", url));
    }
    out.push('\n');
    out
}

pub fn format_executive_summary(summary: &ScanSummary, score: u8) -> String {
    let risk = RiskLevel::from_score(score);
    let assessment = match risk {
        RiskLevel::Low => "System shows strong security posture with minimal vulnerabilities.",
        RiskLevel::Moderate => "Some security issues detected that require attention.",
        RiskLevel::High => "Critical security issues found requiring immediate action.",
    };

    format!(
        "## Executive Summary\n\n**Security Score:** {}/100 ({})\n\n{}\n\n\
         | Metric | Count |\n|---|---|\n\
         | Subdomains discovered | {} |\n| Hosts scanned | {} |\n| Open ports | {} |\n\
         | Critical | {} |\n| High | {} |\n| Medium | {} |\n| Low | {} |\n| Info | {} |\n\
         | **Total vulnerabilities** | **{}** |\n",
        score,
        risk.label(),
        assessment,
        summary.discovered_host_count,
        summary.host_count,
        summary.open_port_count,
        summary.count(Severity::Critical),
        summary.count(Severity::High),
        summary.count(Severity::Medium),
        summary.count(Severity::Low),
        summary.count(Severity::Info),
        summary.vulnerability_count,
    )
}

pub fn format_host_section(record: &TargetScanRecord) -> String {
    let mut out = format!("### {}\n\n", record.host);

    if record.ports.is_empty() {
        out.push_str("No open ports detected or host unreachable.\n\n");
    } else {
        out.push_str("| Port | State | Service | Version |\n|---|---|---|---|\n");
        for port in &record.ports {
            out.push_str(&format!(
                "| {}/{} | {} | {} | {} |\n",
                port.port,
                serde_plain(&port.protocol),
                serde_plain(&port.state),
                port.service,
                port.version.as_deref().unwrap_or("-"),
            ));
        }
        out.push('\n');
    }

    if record.vulnerabilities.is_empty() {
        out.push_str("No vulnerabilities matched.\n\n");
    } else {
        let mut sorted: Vec<&Finding> = record.vulnerabilities.iter().collect();
        sorted.sort_by_key(|f| f.severity);
        for finding in sorted {
            out.push_str(&format_finding_markdown(finding));
        }
        out.push('\n');
    }

    if !record.web_findings.is_empty() {
        out.push_str("Web server notes:\n\n```\n");
        for line in &record.web_findings {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("```\n\n");
    }

    out
}

/// Lowercase wire name of a unit enum.
fn serde_plain<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Capability;

    #[test]
    fn test_finding_line_includes_url() {
        let finding = Finding {
            capability: Capability::Vuln,
            severity: Severity::High,
            identifier: "CVE-2023-1".into(),
            description: "Bad thing".into(),
            source_host: "h".into(),
            url: Some("https://h/x".into()),
        };
        assert_eq!(
            format_finding_markdown(&finding),
            "- **[HIGH]** `CVE-2023-1` Bad thing (https://h/x)\n"
        );
    }

    #[test]
    fn test_executive_summary_risk_band() {
        let summary = ScanSummary::default();
        let text = format_executive_summary(&summary, 45);
        assert!(text.contains("45/100 (High Risk)"));
        assert!(text.contains("| Critical | 0 |"));
    }
}
