//! Registration bookkeeping for the sync scheduler.
//!
//! Pure state: the owning [`super::SyncScheduler`] holds it behind a lock
//! and only changes it through these operations, after the job store has
//! accepted or dropped the corresponding job.

use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerPhase {
    Unscheduled,
    Scheduled,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SchedulerState {
    periodic_job: Option<Uuid>,
    pending_manual_job: Option<Uuid>,
}

impl SchedulerState {
    #[must_use]
    pub fn phase(&self) -> SchedulerPhase {
        if self.periodic_job.is_some() {
            SchedulerPhase::Scheduled
        } else {
            SchedulerPhase::Unscheduled
        }
    }

    #[must_use]
    pub fn periodic_armed(&self) -> bool {
        self.periodic_job.is_some()
    }

    #[must_use]
    pub fn pending_manual_run(&self) -> bool {
        self.pending_manual_job.is_some()
    }

    /// Records the periodic job. Returns `false` if one is already armed, in
    /// which case nothing changes.
    pub fn record_periodic(&mut self, job_id: Uuid) -> bool {
        if self.periodic_job.is_some() {
            return false;
        }
        self.periodic_job = Some(job_id);
        true
    }

    /// Records a queued manual run. Returns `false` if one is already
    /// pending, in which case nothing changes.
    pub fn record_manual(&mut self, job_id: Uuid) -> bool {
        if self.pending_manual_job.is_some() {
            return false;
        }
        self.pending_manual_job = Some(job_id);
        true
    }

    /// Marks the manual run `job_id` as started, so a new trigger can queue
    /// another. Ignores ids that are not the pending run.
    pub fn begin_manual(&mut self, job_id: Uuid) {
        if self.pending_manual_job == Some(job_id) {
            self.pending_manual_job = None;
        }
    }

    /// Clears every registration and returns the job ids to drop.
    pub fn teardown(&mut self) -> Vec<Uuid> {
        self.periodic_job
            .take()
            .into_iter()
            .chain(self.pending_manual_job.take())
            .collect()
    }
}
