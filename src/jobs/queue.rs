use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::errors::DeepScanError;
use crate::utils::truncation::truncate_error;
use super::job::{Job, JobStatus};

/// In-process registry of background jobs. Work is handed to the tokio
/// runtime; each job's entry is only mutated by the task running it.
#[derive(Clone, Default)]
pub struct JobQueue {
    jobs: Arc<DashMap<String, Job>>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `job_id` as pending and schedule `work`. Returns as soon as
    /// the job is registered.
    pub fn enqueue<F, Fut>(&self, job_id: impl Into<String>, work: F) -> Result<String, DeepScanError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let job_id = job_id.into();
        match self.jobs.entry(job_id.clone()) {
            Entry::Occupied(_) => return Err(DeepScanError::DuplicateJob(job_id)),
            Entry::Vacant(slot) => {
                slot.insert(Job::new(&job_id));
            }
        }

        let jobs = self.jobs.clone();
        let id = job_id.clone();
        tokio::spawn(async move {
            advance(&jobs, &id, JobStatus::Running, None);

            let result = AssertUnwindSafe(async move { work().await }).catch_unwind().await;
            match result {
                Ok(Ok(())) => {
                    info!(job_id = %id, "Job completed");
                    advance(&jobs, &id, JobStatus::Complete, None);
                }
                Ok(Err(e)) => {
                    let message = truncate_error(&format!("{:#}", e));
                    error!(job_id = %id, error = %message, "Job failed");
                    advance(&jobs, &id, JobStatus::Failed, Some(message));
                }
                Err(panic) => {
                    let message = truncate_error(&panic_message(panic.as_ref()));
                    error!(job_id = %id, error = %message, "Job panicked");
                    advance(&jobs, &id, JobStatus::Failed, Some(message));
                }
            }
        });

        debug!(job_id = %job_id, "Job queued");
        Ok(job_id)
    }

    pub fn get_status(&self, job_id: &str) -> Option<Job> {
        self.jobs.get(job_id).map(|entry| entry.value().clone())
    }

    /// Snapshots of every registered job, newest first.
    pub fn list(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.jobs.iter().map(|entry| entry.value().clone()).collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Drop finished jobs that completed more than `max_age` ago. Returns
    /// how many were removed.
    pub fn cleanup(&self, max_age: Duration) -> usize {
        let max_age = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);
        let Some(cutoff) = Utc::now().checked_sub_signed(max_age) else {
            return 0;
        };
        let before = self.jobs.len();
        self.jobs.retain(|_, job| match job.completed_at {
            Some(done) if job.status.is_finished() => done >= cutoff,
            _ => true,
        });
        let removed = before.saturating_sub(self.jobs.len());
        if removed > 0 {
            debug!(removed, "Cleaned up finished jobs");
        }
        removed
    }

    /// Run `cleanup` every `interval` until `shutdown` fires. A zero
    /// interval disables the janitor.
    pub fn spawn_janitor(
        &self,
        interval: Duration,
        max_age: Duration,
        shutdown: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        if interval.is_zero() {
            return None;
        }
        let queue = self.clone();
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        queue.cleanup(max_age);
                    }
                    _ = shutdown.cancelled() => break,
                }
            }
            debug!("Job janitor stopped");
        }))
    }
}

fn advance(jobs: &DashMap<String, Job>, id: &str, next: JobStatus, error: Option<String>) {
    if let Some(mut job) = jobs.get_mut(id) {
        if job.transition(next) {
            job.error = error;
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic: {}", s)
    } else {
        "panic: unknown payload".to_string()
    }
}
