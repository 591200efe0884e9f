//! Background sync scheduling.
//!
//! Wraps a [`JobScheduler`] with one periodic sync job and at most one
//! queued manual run. Both kinds of job call [`SyncRunner::run_cycle`],
//! which serializes cycles, so a manual run that overlaps the periodic one
//! waits for it instead of delivering concurrently.

mod state;

use std::sync::Arc;
use std::time::Duration;

use bubblehouse_catalog::CatalogSource;
use bubblehouse_sync::SyncRunner;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

pub use state::{SchedulerPhase, SchedulerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmResult {
    Armed,
    AlreadyArmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerResult {
    Enqueued,
    AlreadyPending,
}

/// Point-in-time view of the registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SchedulerSnapshot {
    pub phase: SchedulerPhase,
    pub periodic_armed: bool,
    pub pending_manual_run: bool,
    pub interval_secs: u64,
}

pub struct SyncScheduler<S> {
    jobs: JobScheduler,
    runner: Arc<SyncRunner<S>>,
    interval: Duration,
    // Held across every check-then-register so two callers cannot both arm.
    state: Arc<Mutex<SchedulerState>>,
}

impl<S: CatalogSource + 'static> SyncScheduler<S> {
    /// Creates the scheduler without starting it.
    ///
    /// # Errors
    ///
    /// Returns [`JobSchedulerError`] if the job store cannot be initialised.
    pub async fn new(runner: Arc<SyncRunner<S>>, interval: Duration) -> Result<Self, JobSchedulerError> {
        Ok(Self {
            jobs: JobScheduler::new().await?,
            runner,
            interval,
            state: Arc::new(Mutex::new(SchedulerState::default())),
        })
    }

    /// Starts ticking; jobs registered before or after this call run on time.
    ///
    /// # Errors
    ///
    /// Returns [`JobSchedulerError`] if the scheduler fails to start.
    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        self.jobs.start().await
    }

    #[must_use]
    pub fn runner(&self) -> &Arc<SyncRunner<S>> {
        &self.runner
    }

    pub async fn snapshot(&self) -> SchedulerSnapshot {
        let state = self.state.lock().await;
        SchedulerSnapshot {
            phase: state.phase(),
            periodic_armed: state.periodic_armed(),
            pending_manual_run: state.pending_manual_run(),
            interval_secs: self.interval.as_secs(),
        }
    }

    /// Registers the periodic sync job unless one is already armed.
    ///
    /// # Errors
    ///
    /// Returns [`JobSchedulerError`] if the job cannot be created or added;
    /// the state is left unarmed in that case.
    pub async fn arm(&self) -> Result<ArmResult, JobSchedulerError> {
        let mut state = self.state.lock().await;
        if state.periodic_armed() {
            tracing::debug!("scheduler: periodic sync already armed");
            return Ok(ArmResult::AlreadyArmed);
        }

        let runner = Arc::clone(&self.runner);
        let job = Job::new_repeated_async(self.interval, move |_uuid, _lock| {
            let runner = Arc::clone(&runner);
            Box::pin(async move {
                tracing::info!("scheduler: starting periodic sync run");
                let outcome = runner.run_cycle().await;
                tracing::info!(delivered = outcome.is_delivered(), "scheduler: periodic sync run complete");
            })
        })?;

        let job_id = self.jobs.add(job).await?;
        state.record_periodic(job_id);
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "scheduler: registered periodic sync job"
        );
        Ok(ArmResult::Armed)
    }

    /// Queues an immediate one-off sync unless one is already pending.
    ///
    /// Works whether or not the periodic job is armed and never changes it.
    ///
    /// # Errors
    ///
    /// Returns [`JobSchedulerError`] if the job cannot be created or added.
    pub async fn trigger(&self) -> Result<TriggerResult, JobSchedulerError> {
        let mut state = self.state.lock().await;
        if state.pending_manual_run() {
            tracing::info!("scheduler: manual sync already pending");
            return Ok(TriggerResult::AlreadyPending);
        }

        let runner = Arc::clone(&self.runner);
        let registry = Arc::clone(&self.state);
        let job = Job::new_one_shot_async(Duration::ZERO, move |job_id, _lock| {
            let runner = Arc::clone(&runner);
            let registry = Arc::clone(&registry);
            Box::pin(async move {
                registry.lock().await.begin_manual(job_id);
                tracing::info!("scheduler: starting manual sync run");
                let outcome = runner.run_cycle().await;
                tracing::info!(delivered = outcome.is_delivered(), "scheduler: manual sync run complete");
            })
        })?;

        let job_id = self.jobs.add(job).await?;
        state.record_manual(job_id);
        tracing::info!("scheduler: manual sync enqueued");
        Ok(TriggerResult::Enqueued)
    }

    /// Drops the periodic job and any pending manual run.
    ///
    /// A cycle already running is not interrupted.
    pub async fn teardown(&self) {
        let mut state = self.state.lock().await;
        for job_id in state.teardown() {
            if let Err(e) = self.jobs.remove(&job_id).await {
                tracing::warn!(%job_id, error = %e, "scheduler: failed to remove job");
            }
        }
        tracing::info!("scheduler: sync jobs cleared");
    }

    /// Tears down and stops the underlying job scheduler.
    pub async fn shutdown(&self) {
        self.teardown().await;
        let mut jobs = self.jobs.clone();
        if let Err(e) = jobs.shutdown().await {
            tracing::warn!(error = %e, "scheduler: shutdown failed");
        }
    }
}
