use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::finding::Severity;
use super::target::TargetScanRecord;

/// Severity → count. Only non-zero buckets are present.
pub type SeverityCounts = BTreeMap<Severity, usize>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanSummary {
    pub host_count: usize,
    pub discovered_host_count: usize,
    pub open_port_count: usize,
    pub vulnerability_count: usize,
    pub severity_counts: SeverityCounts,
}

impl ScanSummary {
    pub fn count(&self, severity: Severity) -> usize {
        self.severity_counts.get(&severity).copied().unwrap_or(0)
    }
}

/// The aggregated, scored result of one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub id: String,
    pub subject_id: String,
    pub domain: String,
    /// Every host enumeration returned, including those past the scan bound.
    pub discovered_hosts: Vec<String>,
    pub hosts: Vec<TargetScanRecord>,
    pub summary: ScanSummary,
    pub score: u8,
    pub generated_at: DateTime<Utc>,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_counts_serialize_as_lowercase_keys() {
        let mut summary = ScanSummary::default();
        summary.severity_counts.insert(Severity::Critical, 1);
        summary.severity_counts.insert(Severity::Low, 3);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["severity_counts"]["critical"], 1);
        assert_eq!(json["severity_counts"]["low"], 3);
        assert!(json["severity_counts"].get("high").is_none());

        let back: ScanSummary = serde_json::from_value(json).unwrap();
        assert_eq!(back.count(Severity::Critical), 1);
        assert_eq!(back.count(Severity::High), 0);
    }
}
