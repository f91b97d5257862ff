use crate::errors::DeepScanError;
use crate::models::{ScanReport, Severity};
use super::Database;

fn report_from_row(row: &rusqlite::Row) -> rusqlite::Result<ScanReport> {
    let raw: String = row.get(0)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

impl Database {
    pub fn insert_scan_report(&self, report: &ScanReport) -> Result<(), DeepScanError> {
        let report_json = serde_json::to_string(report)?;
        let summary = &report.summary;
        let count = |s| summary.count(s) as i64;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO scan_reports (id, subject_id, domain, score, host_count, open_port_count, vulnerability_count, \
             finding_count_critical, finding_count_high, finding_count_medium, finding_count_low, finding_count_info, \
             duration_ms, report_json, generated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            rusqlite::params![
                report.id,
                report.subject_id,
                report.domain,
                report.score as i64,
                summary.host_count as i64,
                summary.open_port_count as i64,
                summary.vulnerability_count as i64,
                count(Severity::Critical),
                count(Severity::High),
                count(Severity::Medium),
                count(Severity::Low),
                count(Severity::Info),
                report.duration_ms as i64,
                report_json,
                report.generated_at.to_rfc3339(),
            ],
        ).map_err(|e| DeepScanError::Database(format!("Failed to save report: {}", e)))?;
        Ok(())
    }

    pub fn latest_report(&self, subject_id: &str) -> Result<Option<ScanReport>, DeepScanError> {
        Ok(self.reports_for_subject(subject_id, 1)?.into_iter().next())
    }

    /// Newest first.
    pub fn reports_for_subject(&self, subject_id: &str, limit: usize) -> Result<Vec<ScanReport>, DeepScanError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT report_json FROM scan_reports WHERE subject_id = ?1 ORDER BY generated_at DESC, rowid DESC LIMIT ?2"
        ).map_err(|e| DeepScanError::Database(format!("Query failed: {}", e)))?;

        let rows = stmt.query_map(rusqlite::params![subject_id, limit as i64], report_from_row)
            .map_err(|e| DeepScanError::Database(format!("Query failed: {}", e)))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| DeepScanError::Database(format!("Row read failed: {}", e)))
    }
}
