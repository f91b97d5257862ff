use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::db::PersistenceStore;
use crate::errors::DeepScanError;
use crate::jobs::{Job, JobQueue};
use crate::models::{NewSubject, Subject, SubjectStatus, SubjectUpdate, Target};
use crate::pipeline::{RunState, ScanOrchestrator};
use crate::reporting::render_markdown;

/// Reports kept alongside the latest one when rendering.
const REPORT_HISTORY: usize = 10;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StartScanResponse {
    pub job_id: Option<String>,
    pub subject_id: String,
    pub status: SubjectStatus,
    pub already_running: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanStatusResponse {
    pub subject_id: String,
    pub status: SubjectStatus,
    pub last_scan_at: Option<DateTime<Utc>>,
    pub latest_score: Option<u8>,
    pub latest_finding_count: Option<usize>,
    pub active: bool,
    /// Live state of the in-flight run, if any.
    pub progress: Option<RunState>,
    /// Progress text last written to the subject.
    pub stored_progress: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobListResponse {
    pub active_scans: usize,
    pub jobs: Vec<Job>,
}

/// The operations exposed to the HTTP and CLI surfaces.
#[derive(Clone)]
pub struct ScanTrigger {
    store: Arc<dyn PersistenceStore>,
    orchestrator: Arc<ScanOrchestrator>,
    jobs: JobQueue,
}

impl ScanTrigger {
    pub fn new(store: Arc<dyn PersistenceStore>, orchestrator: Arc<ScanOrchestrator>, jobs: JobQueue) -> Self {
        Self { store, orchestrator, jobs }
    }

    pub fn jobs(&self) -> &JobQueue {
        &self.jobs
    }

    pub fn orchestrator(&self) -> &Arc<ScanOrchestrator> {
        &self.orchestrator
    }

    /// Register a subject. The URL must resolve to a domain.
    pub async fn register_subject(&self, new: NewSubject) -> Result<Subject, DeepScanError> {
        let domain = Target::domain_from_url(&new.url)
            .ok_or_else(|| DeepScanError::InvalidTarget(new.url.clone()))?;
        let new = if new.name.trim().is_empty() {
            NewSubject { name: domain, ..new }
        } else {
            new
        };
        let subject = self.store.create_subject(&new).await?;
        info!(subject_id = %subject.id, url = %subject.url, "Subject registered");
        Ok(subject)
    }

    pub async fn list_subjects(&self) -> Result<Vec<Subject>, DeepScanError> {
        self.store.list_subjects().await
    }

    async fn require_subject(&self, subject_id: &str) -> Result<Subject, DeepScanError> {
        self.store
            .find_subject_by_id(subject_id)
            .await?
            .ok_or_else(|| DeepScanError::SubjectNotFound(subject_id.to_string()))
    }

    /// Start a background deep scan and return immediately.
    ///
    /// The subject is claimed in the active-scan lock here and the claim is
    /// handed to the job, so concurrent calls for one subject start exactly
    /// one run. The others get `already_running`.
    pub async fn start_deep_scan(&self, subject_id: &str) -> Result<StartScanResponse, DeepScanError> {
        self.require_subject(subject_id).await?;

        let Some(guard) = self.orchestrator.active_scans().try_acquire(subject_id) else {
            info!(subject_id = %subject_id, "Deep scan already running");
            return Ok(StartScanResponse {
                job_id: None,
                subject_id: subject_id.to_string(),
                status: SubjectStatus::Scanning,
                already_running: true,
            });
        };

        // Before enqueueing, so a fast run's final status is never overwritten.
        self.store
            .update_subject_status(subject_id, SubjectStatus::Scanning, SubjectUpdate::default())
            .await?;

        let job_id = format!("scan-{}-{}", subject_id, Uuid::new_v4());
        let orchestrator = self.orchestrator.clone();
        let job_id = self.jobs.enqueue(job_id, move || async move {
            orchestrator.run_acquired(guard).await?;
            Ok(())
        })?;

        info!(subject_id = %subject_id, job_id = %job_id, "Deep scan queued");
        Ok(StartScanResponse {
            job_id: Some(job_id),
            subject_id: subject_id.to_string(),
            status: SubjectStatus::Scanning,
            already_running: false,
        })
    }

    pub async fn get_scan_status(&self, subject_id: &str) -> Result<ScanStatusResponse, DeepScanError> {
        let subject = self.require_subject(subject_id).await?;
        let latest = self.store.latest_scan_report(subject_id).await?;
        let progress = self.orchestrator.active_scans().snapshot(subject_id);

        Ok(ScanStatusResponse {
            subject_id: subject.id,
            status: subject.status,
            last_scan_at: subject.last_scan_at,
            latest_score: latest.as_ref().map(|r| r.score),
            latest_finding_count: latest.as_ref().map(|r| r.summary.vulnerability_count),
            active: progress.is_some(),
            progress,
            stored_progress: subject.progress,
        })
    }

    pub fn get_job_status(&self, job_id: &str) -> Option<Job> {
        self.jobs.get_status(job_id)
    }

    /// Every tracked job, newest first, plus how many runs hold the lock.
    pub fn list_jobs(&self) -> JobListResponse {
        JobListResponse {
            active_scans: self.orchestrator.active_scans().active_count(),
            jobs: self.jobs.list(),
        }
    }

    /// Markdown for the newest report, with recent history.
    pub async fn render_latest_report(&self, subject_id: &str) -> Result<String, DeepScanError> {
        let subject = self.require_subject(subject_id).await?;
        let mut reports = self
            .store
            .list_scan_reports(subject_id, REPORT_HISTORY + 1)
            .await?
            .into_iter();
        let latest = reports
            .next()
            .ok_or_else(|| DeepScanError::ReportNotFound(subject_id.to_string()))?;
        let history: Vec<_> = reports.collect();
        Ok(render_markdown(&subject, &latest, &history))
    }
}
