use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::state::{RunPhase, RunState};

/// Subjects with an in-flight run, keyed by subject id.
///
/// Membership is only changed through `try_acquire` and the returned
/// guard's `Drop`, so it always equals the set of running subjects.
#[derive(Clone, Default)]
pub struct ActiveScanLock {
    active: Arc<DashMap<String, RunState>>,
}

impl ActiveScanLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claim `subject_id`. `None` if a run already holds it.
    pub fn try_acquire(&self, subject_id: &str) -> Option<ScanGuard> {
        match self.active.entry(subject_id.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(RunState::new());
                Some(ScanGuard {
                    active: self.active.clone(),
                    subject_id: subject_id.to_string(),
                })
            }
        }
    }

    pub fn is_active(&self, subject_id: &str) -> bool {
        self.active.contains_key(subject_id)
    }

    pub fn snapshot(&self, subject_id: &str) -> Option<RunState> {
        self.active.get(subject_id).map(|entry| entry.value().clone())
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

/// Held for the lifetime of one run. Releases the subject on drop, whatever
/// path the run leaves by.
pub struct ScanGuard {
    active: Arc<DashMap<String, RunState>>,
    subject_id: String,
}

impl ScanGuard {
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn set_phase(&self, phase: RunPhase) {
        if let Some(mut entry) = self.active.get_mut(&self.subject_id) {
            entry.phase = phase;
        }
    }
}

impl Drop for ScanGuard {
    fn drop(&mut self) {
        self.active.remove(&self.subject_id);
    }
}
