use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where an orchestration run currently is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "phase", rename_all = "kebab-case")]
pub enum RunPhase {
    Idle,
    Enumerating,
    ScanningHosts { current: usize, total: usize },
    Aggregating,
    Scored,
    Persisted,
    Done,
    Failed,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Enumerating => write!(f, "enumerating"),
            Self::ScanningHosts { current, total } => write!(f, "scanning-hosts {}/{}", current, total),
            Self::Aggregating => write!(f, "aggregating"),
            Self::Scored => write!(f, "scored"),
            Self::Persisted => write!(f, "persisted"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Externally visible state of one in-flight run. Lives in the
/// active-scan lock entry for its subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunState {
    #[serde(flatten)]
    pub phase: RunPhase,
    pub started_at: DateTime<Utc>,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Idle,
            started_at: Utc::now(),
        }
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// How a run that did not fail ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(crate::models::ScanReport),
    /// Another run for the subject held the lock; nothing was done.
    AlreadyRunning,
}
