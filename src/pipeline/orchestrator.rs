use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde_json::{json, Value};
use tokio_util::task::TaskTracker;
use uuid::Uuid;

use crate::capabilities::Capabilities;
use crate::config::ScanSettings;
use crate::db::PersistenceStore;
use crate::errors::DeepScanError;
use crate::models::{LogLevel, ScanReport, Severity, Subject, SubjectStatus, SubjectUpdate, Target};
use crate::notify::NotificationSender;
use crate::process::CommandRunner;
use crate::utils::formatting::{format_duration, format_progress};
use super::lock::{ActiveScanLock, ScanGuard};
use super::metrics::compute_summary;
use super::scoring;
use super::state::{RunOutcome, RunPhase};
use super::target_scanner::TargetScanner;
use tracing::{error, info, warn};

/// Drives one deep scan of a subject from enumeration to persisted report.
pub struct ScanOrchestrator {
    store: Arc<dyn PersistenceStore>,
    notifier: Arc<dyn NotificationSender>,
    capabilities: Arc<Capabilities>,
    scanner: TargetScanner,
    lock: ActiveScanLock,
    max_hosts: usize,
    alert_score_threshold: u8,
    notify_timeout: Duration,
    alerts: TaskTracker,
}

impl ScanOrchestrator {
    pub fn new(
        store: Arc<dyn PersistenceStore>,
        notifier: Arc<dyn NotificationSender>,
        runner: Arc<dyn CommandRunner>,
        lock: ActiveScanLock,
        settings: &ScanSettings,
    ) -> Self {
        let capabilities = Arc::new(Capabilities::new(runner, settings));
        Self {
            store,
            notifier,
            scanner: TargetScanner::new(capabilities.clone(), settings.stage_pause),
            capabilities,
            lock,
            max_hosts: settings.max_hosts.max(1),
            alert_score_threshold: settings.alert_score_threshold,
            notify_timeout: settings.notify_timeout,
            alerts: TaskTracker::new(),
        }
    }

    pub fn active_scans(&self) -> &ActiveScanLock {
        &self.lock
    }

    /// Wait for every alert delivery spawned so far to finish or time out.
    pub async fn wait_for_alerts(&self) {
        self.alerts.close();
        self.alerts.wait().await;
        self.alerts.reopen();
    }

    /// Run a full deep scan of `subject_id`.
    ///
    /// Returns `AlreadyRunning` without touching anything if a run for the
    /// subject is in flight. On failure the subject is marked down and an
    /// error event is logged before the error is returned. The subject is
    /// released from the active-scan lock on every path.
    pub async fn run(&self, subject_id: &str) -> Result<RunOutcome, DeepScanError> {
        let Some(guard) = self.lock.try_acquire(subject_id) else {
            info!(subject_id = %subject_id, "Deep scan already running, skipping");
            return Ok(RunOutcome::AlreadyRunning);
        };
        self.run_acquired(guard).await.map(RunOutcome::Completed)
    }

    /// Run with a lock entry the caller already claimed. The guard is
    /// dropped, releasing the subject, when this returns.
    pub async fn run_acquired(&self, guard: ScanGuard) -> Result<ScanReport, DeepScanError> {
        let started = Instant::now();
        match self.execute(&guard, started).await {
            Ok(report) => {
                guard.set_phase(RunPhase::Done);
                Ok(report)
            }
            Err(e) => {
                guard.set_phase(RunPhase::Failed);
                self.record_failure(guard.subject_id(), &e).await;
                Err(e)
            }
        }
    }

    async fn execute(&self, guard: &ScanGuard, started: Instant) -> Result<ScanReport, DeepScanError> {
        let subject_id = guard.subject_id();
        let subject = self
            .store
            .find_subject_by_id(subject_id)
            .await?
            .ok_or_else(|| DeepScanError::SubjectNotFound(subject_id.to_string()))?;

        self.store
            .update_subject_status(subject_id, SubjectStatus::Scanning, SubjectUpdate::default())
            .await?;

        let domain = Target::domain_from_url(&subject.url)
            .ok_or_else(|| DeepScanError::InvalidTarget(subject.url.clone()))?;

        info!(subject_id = %subject_id, domain = %domain, "Starting deep scan");

        guard.set_phase(RunPhase::Enumerating);
        let discovered = self.capabilities.enumerator.enumerate(&domain).await;
        let target = Target {
            domain: domain.clone(),
            resolved_hosts: discovered.iter().take(self.max_hosts).cloned().collect(),
        };
        let total = target.resolved_hosts.len();
        info!(
            subject_id = %subject_id,
            discovered = discovered.len(),
            scanning = total,
            "Hosts selected"
        );

        let mut records = Vec::with_capacity(total);
        for (i, host) in target.resolved_hosts.iter().enumerate() {
            guard.set_phase(RunPhase::ScanningHosts { current: i + 1, total });
            records.push(self.scanner.scan(host).await);
            self.store
                .update_subject_status(
                    subject_id,
                    SubjectStatus::Scanning,
                    SubjectUpdate::progress(format_progress(i + 1, total)),
                )
                .await?;
        }

        guard.set_phase(RunPhase::Aggregating);
        let summary = compute_summary(&records, discovered.len());

        let score = scoring::score(&summary.severity_counts);
        guard.set_phase(RunPhase::Scored);

        let duration_ms = started.elapsed().as_millis() as u64;
        let report = ScanReport {
            id: Uuid::new_v4().to_string(),
            subject_id: subject_id.to_string(),
            domain,
            discovered_hosts: discovered,
            hosts: records,
            summary,
            score,
            generated_at: Utc::now(),
            duration_ms,
        };

        // Point of no return: the report stays even if a later step fails.
        self.store.create_scan_report(&report).await?;
        self.store
            .update_subject_status(subject_id, SubjectStatus::Scanned, SubjectUpdate::scanned_at(report.generated_at))
            .await?;
        guard.set_phase(RunPhase::Persisted);

        self.record_completion(&subject, &report).await;
        self.maybe_alert(&subject, &report);

        Ok(report)
    }

    async fn record_completion(&self, subject: &Subject, report: &ScanReport) {
        let summary = &report.summary;
        info!(
            subject_id = %subject.id,
            score = report.score,
            subdomains = summary.discovered_host_count,
            scanned = summary.host_count,
            ports = summary.open_port_count,
            vulns = summary.vulnerability_count,
            duration = %format_duration(report.duration_ms),
            "Deep scan complete"
        );

        let metadata = json!({
            "score": report.score,
            "subdomains": summary.discovered_host_count,
            "scanned": summary.host_count,
            "ports": summary.open_port_count,
            "vulns": summary.vulnerability_count,
            "duration": Duration::from_millis(report.duration_ms).as_secs_f64().round() as u64,
        });
        self.log_event(
            LogLevel::Info,
            &format!("Deep scan completed for {}", subject.name),
            &subject.id,
            metadata,
        )
        .await;
    }

    async fn record_failure(&self, subject_id: &str, err: &DeepScanError) {
        let class = err.classify();
        error!(subject_id = %subject_id, error = %err, error_type = class.error_type, "Deep scan failed");

        if let Err(e) = self
            .store
            .update_subject_status(subject_id, SubjectStatus::Down, SubjectUpdate::default())
            .await
        {
            warn!(subject_id = %subject_id, error = %e, "Failed to mark subject down");
        }

        self.log_event(
            LogLevel::Error,
            &format!("Deep scan failed for {}", subject_id),
            subject_id,
            json!({
                "error": err.to_string(),
                "error_type": class.error_type,
                "caller_fault": class.caller_fault,
            }),
        )
        .await;
    }

    /// Best effort: a failed write is logged, never propagated.
    async fn log_event(&self, level: LogLevel, message: &str, subject_id: &str, metadata: Value) {
        if let Err(e) = self
            .store
            .create_log_event(level, message, Some(subject_id), metadata)
            .await
        {
            warn!(subject_id = %subject_id, error = %e, "Failed to write log event");
        }
    }

    /// Delivery runs detached under `notify_timeout` so a slow endpoint
    /// never holds the subject's lock.
    fn maybe_alert(&self, subject: &Subject, report: &ScanReport) {
        let Some(email) = subject.owner_email.as_deref() else {
            return;
        };
        if !should_alert(report, self.alert_score_threshold) {
            return;
        }

        let notifier = self.notifier.clone();
        let limit = self.notify_timeout;
        let subject_id = subject.id.clone();
        let email = email.to_string();
        let title = format!("Security Alert: {} is AT RISK", subject.name);
        let detail = alert_detail(report);
        self.alerts.spawn(async move {
            match tokio::time::timeout(limit, notifier.send_alert(&email, &title, &detail)).await {
                Ok(Ok(())) => info!(subject_id = %subject_id, notifier = notifier.name(), "Alert sent"),
                Ok(Err(e)) => warn!(subject_id = %subject_id, error = %e, "Failed to send alert"),
                Err(_) => warn!(
                    subject_id = %subject_id,
                    timeout = %format_duration(limit.as_millis() as u64),
                    "Alert delivery timed out"
                ),
            }
        });
    }
}

/// Alert when the score falls under `threshold` or anything critical was found.
pub fn should_alert(report: &ScanReport, threshold: u8) -> bool {
    report.score < threshold || report.summary.count(Severity::Critical) > 0
}

fn alert_detail(report: &ScanReport) -> String {
    let counts: Vec<String> = Severity::ALL
        .iter()
        .filter(|s| **s != Severity::Info)
        .map(|s| format!("{} {}", report.summary.count(*s), s))
        .collect();
    format!(
        "Deep scan of {} scored {}/100 across {} host(s): {}.",
        report.domain,
        report.score,
        report.summary.host_count,
        counts.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::testing::ScriptedRunner;
    use crate::db::Database;
    use crate::models::NewSubject;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl NotificationSender for RecordingNotifier {
        async fn send_alert(&self, recipient: &str, subject: &str, detail: &str) -> Result<(), DeepScanError> {
            self.sent
                .lock()
                .unwrap()
                .push((recipient.into(), subject.into(), detail.into()));
            if self.fail {
                Err(DeepScanError::Notification("smtp down".into()))
            } else {
                Ok(())
            }
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn settings() -> ScanSettings {
        ScanSettings { stage_pause: Duration::ZERO, ..ScanSettings::default() }
    }

    /// Never answers; stands in for an endpoint that accepts and stalls.
    struct StalledNotifier;

    #[async_trait]
    impl NotificationSender for StalledNotifier {
        async fn send_alert(&self, _: &str, _: &str, _: &str) -> Result<(), DeepScanError> {
            std::future::pending().await
        }

        fn name(&self) -> &str {
            "stalled"
        }
    }

    fn orchestrator(
        db: &Database,
        runner: impl Into<Arc<ScriptedRunner>>,
        notifier: Arc<dyn NotificationSender>,
    ) -> ScanOrchestrator {
        let runner: Arc<ScriptedRunner> = runner.into();
        ScanOrchestrator::new(
            Arc::new(db.clone()),
            notifier,
            runner,
            ActiveScanLock::new(),
            &settings(),
        )
    }

    fn add_subject(db: &Database, url: &str, email: Option<&str>) -> Subject {
        db.create_subject(&NewSubject {
            name: "Example".into(),
            url: url.into(),
            owner_email: email.map(str::to_string),
        })
        .unwrap()
    }

    const CRITICAL_JSONL: &str =
        r#"{"template-id":"CVE-2021-44228","info":{"name":"Log4Shell","severity":"critical"}}"#;

    #[tokio::test]
    async fn test_clean_run_scores_100_without_alert() {
        let db = Database::in_memory().unwrap();
        let subject = add_subject(&db, "https://example.com", Some("o@example.com"));
        let notifier = Arc::new(RecordingNotifier::default());
        let runner = ScriptedRunner::new().reply("nmap", "443/tcp open https\n", true);
        let orch = orchestrator(&db, runner, notifier.clone());

        let outcome = orch.run(&subject.id).await.unwrap();
        orch.wait_for_alerts().await;
        let RunOutcome::Completed(report) = outcome else { panic!("expected completion") };
        assert_eq!(report.score, 100);
        assert_eq!(report.discovered_hosts, vec!["example.com"]);
        assert_eq!(report.summary.open_port_count, 1);
        assert!(notifier.sent.lock().unwrap().is_empty());

        let stored = db.get_subject(&subject.id).unwrap().unwrap();
        assert_eq!(stored.status, SubjectStatus::Scanned);
        assert!(stored.last_scan_at.is_some());
        assert!(stored.progress.is_none());
        assert!(!orch.active_scans().is_active(&subject.id));
    }

    #[tokio::test]
    async fn test_critical_finding_triggers_alert() {
        let db = Database::in_memory().unwrap();
        let subject = add_subject(&db, "example.com", Some("o@example.com"));
        let notifier = Arc::new(RecordingNotifier::default());
        let runner = ScriptedRunner::new().reply("nuclei", CRITICAL_JSONL, true);
        let orch = orchestrator(&db, runner, notifier.clone());

        orch.run(&subject.id).await.unwrap();
        orch.wait_for_alerts().await;
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "o@example.com");
        assert_eq!(sent[0].1, "Security Alert: Example is AT RISK");
        assert!(sent[0].2.contains("75/100"));
        assert!(sent[0].2.contains("1 critical"));
    }

    #[tokio::test]
    async fn test_no_owner_email_means_no_alert() {
        let db = Database::in_memory().unwrap();
        let subject = add_subject(&db, "example.com", None);
        let notifier = Arc::new(RecordingNotifier::default());
        let runner = ScriptedRunner::new().reply("nuclei", CRITICAL_JSONL, true);
        let orch = orchestrator(&db, runner, notifier.clone());
        orch.run(&subject.id).await.unwrap();
        orch.wait_for_alerts().await;
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failing_notifier_does_not_fail_run() {
        let db = Database::in_memory().unwrap();
        let subject = add_subject(&db, "example.com", Some("o@example.com"));
        let notifier = Arc::new(RecordingNotifier { fail: true, ..Default::default() });
        let runner = ScriptedRunner::new().reply("nuclei", CRITICAL_JSONL, true);
        let orch = orchestrator(&db, runner, notifier.clone());
        let outcome = orch.run(&subject.id).await;
        orch.wait_for_alerts().await;
        assert!(matches!(outcome, Ok(RunOutcome::Completed(_))));
        assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stalled_notifier_does_not_hold_lock() {
        let db = Database::in_memory().unwrap();
        let subject = add_subject(&db, "example.com", Some("o@example.com"));
        let runner = ScriptedRunner::new().reply("nuclei", CRITICAL_JSONL, true);
        let orch = ScanOrchestrator::new(
            Arc::new(db.clone()),
            Arc::new(StalledNotifier),
            Arc::new(runner),
            ActiveScanLock::new(),
            &ScanSettings { notify_timeout: Duration::from_millis(50), ..settings() },
        );

        let outcome = tokio::time::timeout(Duration::from_secs(5), orch.run(&subject.id))
            .await
            .expect("run returns while the alert is still pending");
        assert!(matches!(outcome, Ok(RunOutcome::Completed(_))));
        assert!(!orch.active_scans().is_active(&subject.id));
        assert_eq!(db.get_subject(&subject.id).unwrap().unwrap().status, SubjectStatus::Scanned);

        tokio::time::timeout(Duration::from_secs(5), orch.wait_for_alerts())
            .await
            .expect("delivery gives up after the notify timeout");
    }

    #[tokio::test]
    async fn test_missing_subject_fails_and_releases_lock() {
        let db = Database::in_memory().unwrap();
        let orch = orchestrator(&db, ScriptedRunner::new(), Arc::new(RecordingNotifier::default()));

        let err = orch.run("ghost").await.unwrap_err();
        assert!(matches!(err, DeepScanError::SubjectNotFound(_)));
        assert!(!orch.active_scans().is_active("ghost"));

        let events = db.log_events(Some("ghost"), 10).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, LogLevel::Error);
        assert_eq!(events[0].metadata["error_type"], "SubjectNotFoundError");
        assert_eq!(events[0].metadata["caller_fault"], true);
    }

    #[tokio::test]
    async fn test_invalid_url_marks_subject_down() {
        let db = Database::in_memory().unwrap();
        let subject = add_subject(&db, "https://", None);
        let orch = orchestrator(&db, ScriptedRunner::new(), Arc::new(RecordingNotifier::default()));

        let err = orch.run(&subject.id).await.unwrap_err();
        assert!(matches!(err, DeepScanError::InvalidTarget(_)));
        assert_eq!(db.get_subject(&subject.id).unwrap().unwrap().status, SubjectStatus::Down);
        assert!(db.latest_report(&subject.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_flag_like_url_never_reaches_tools() {
        let db = Database::in_memory().unwrap();
        let subject = add_subject(&db, "--script=vuln", None);
        let runner = Arc::new(ScriptedRunner::new());
        let orch = orchestrator(&db, runner.clone(), Arc::new(RecordingNotifier::default()));

        let err = orch.run(&subject.id).await.unwrap_err();
        assert!(matches!(err, DeepScanError::InvalidTarget(_)));
        assert!(runner.calls.lock().unwrap().is_empty());
        assert_eq!(db.get_subject(&subject.id).unwrap().unwrap().status, SubjectStatus::Down);
        assert!(!orch.active_scans().is_active(&subject.id));

        let events = db.log_events(Some(&subject.id), 10).unwrap();
        assert_eq!(events[0].metadata["error_type"], "InvalidTargetError");
    }

    #[tokio::test]
    async fn test_held_lock_returns_already_running() {
        let db = Database::in_memory().unwrap();
        let subject = add_subject(&db, "example.com", None);
        let orch = orchestrator(&db, ScriptedRunner::new(), Arc::new(RecordingNotifier::default()));

        let _held = orch.active_scans().try_acquire(&subject.id).unwrap();
        let outcome = orch.run(&subject.id).await.unwrap();
        assert_eq!(outcome, RunOutcome::AlreadyRunning);
        assert_eq!(db.get_subject(&subject.id).unwrap().unwrap().status, SubjectStatus::Pending);
    }

    #[tokio::test]
    async fn test_host_bound_applies() {
        let db = Database::in_memory().unwrap();
        let subject = add_subject(&db, "example.com", None);
        let hosts: String = (1..=8).map(|i| format!("h{}.example.com\n", i)).collect();
        let runner = ScriptedRunner::new().reply("sublist3r", &hosts, true);
        let orch = orchestrator(&db, runner, Arc::new(RecordingNotifier::default()));

        let RunOutcome::Completed(report) = orch.run(&subject.id).await.unwrap() else {
            panic!("expected completion")
        };
        assert_eq!(report.discovered_hosts.len(), 8);
        assert_eq!(report.hosts.len(), 5);
        assert_eq!(report.hosts[4].host, "h5.example.com");
        assert_eq!(report.summary.discovered_host_count, 8);
    }

    #[test]
    fn test_alert_condition() {
        let mut report = ScanReport {
            id: "r".into(),
            subject_id: "s".into(),
            domain: "example.com".into(),
            discovered_hosts: vec![],
            hosts: vec![],
            summary: Default::default(),
            score: 90,
            generated_at: Utc::now(),
            duration_ms: 0,
        };
        assert!(!should_alert(&report, 50));
        report.score = 49;
        assert!(should_alert(&report, 50));
        report.score = 90;
        report.summary.severity_counts.insert(Severity::Critical, 1);
        assert!(should_alert(&report, 50));
    }
}
