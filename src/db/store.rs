use async_trait::async_trait;
use serde_json::Value;

use crate::errors::DeepScanError;
use crate::models::{LogEvent, LogLevel, NewSubject, ScanReport, Subject, SubjectStatus, SubjectUpdate};
use super::Database;

/// Everything the scan pipeline and trigger surface need from storage.
/// Each call is individually atomic; nothing spans calls.
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    async fn find_subject_by_id(&self, id: &str) -> Result<Option<Subject>, DeepScanError>;

    async fn update_subject_status(
        &self,
        id: &str,
        status: SubjectStatus,
        update: SubjectUpdate,
    ) -> Result<(), DeepScanError>;

    async fn create_scan_report(&self, report: &ScanReport) -> Result<(), DeepScanError>;

    async fn create_log_event(
        &self,
        level: LogLevel,
        message: &str,
        subject_id: Option<&str>,
        metadata: Value,
    ) -> Result<(), DeepScanError>;

    async fn create_subject(&self, new: &NewSubject) -> Result<Subject, DeepScanError>;

    async fn list_subjects(&self) -> Result<Vec<Subject>, DeepScanError>;

    async fn latest_scan_report(&self, subject_id: &str) -> Result<Option<ScanReport>, DeepScanError>;

    async fn list_scan_reports(&self, subject_id: &str, limit: usize) -> Result<Vec<ScanReport>, DeepScanError>;

    async fn list_log_events(&self, subject_id: Option<&str>, limit: usize) -> Result<Vec<LogEvent>, DeepScanError>;
}

#[async_trait]
impl PersistenceStore for Database {
    async fn find_subject_by_id(&self, id: &str) -> Result<Option<Subject>, DeepScanError> {
        self.get_subject(id)
    }

    async fn update_subject_status(
        &self,
        id: &str,
        status: SubjectStatus,
        update: SubjectUpdate,
    ) -> Result<(), DeepScanError> {
        self.set_subject_status(id, status, &update)
    }

    async fn create_scan_report(&self, report: &ScanReport) -> Result<(), DeepScanError> {
        self.insert_scan_report(report)
    }

    async fn create_log_event(
        &self,
        level: LogLevel,
        message: &str,
        subject_id: Option<&str>,
        metadata: Value,
    ) -> Result<(), DeepScanError> {
        self.insert_log_event(level, message, subject_id, &metadata).map(|_| ())
    }

    async fn create_subject(&self, new: &NewSubject) -> Result<Subject, DeepScanError> {
        Database::create_subject(self, new)
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>, DeepScanError> {
        Database::list_subjects(self)
    }

    async fn latest_scan_report(&self, subject_id: &str) -> Result<Option<ScanReport>, DeepScanError> {
        self.latest_report(subject_id)
    }

    async fn list_scan_reports(&self, subject_id: &str, limit: usize) -> Result<Vec<ScanReport>, DeepScanError> {
        self.reports_for_subject(subject_id, limit)
    }

    async fn list_log_events(&self, subject_id: Option<&str>, limit: usize) -> Result<Vec<LogEvent>, DeepScanError> {
        self.log_events(subject_id, limit)
    }
}
