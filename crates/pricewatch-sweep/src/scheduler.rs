//! Background sweep scheduler.
//!
//! Wraps a [`JobScheduler`] with one repeating job. A run-lock guarantees at
//! most one sweep at a time; ticks that find it held are skipped.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use pricewatch_core::{SweepReport, SweepStatus};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::engine::{StopSignal, SweepEngine};
use crate::error::SweepError;

/// State of the most recent sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepState {
    Idle,
    Running,
    Completed,
    Aborted,
}

impl std::fmt::Display for SweepState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweepState::Idle => write!(f, "idle"),
            SweepState::Running => write!(f, "running"),
            SweepState::Completed => write!(f, "completed"),
            SweepState::Aborted => write!(f, "aborted"),
        }
    }
}

struct SweepRunner {
    engine: SweepEngine,
    run_lock: tokio::sync::Mutex<()>,
    stop: StopSignal,
    state: Mutex<SweepState>,
}

impl SweepRunner {
    async fn run_exclusive(&self) -> Option<SweepReport> {
        let Ok(_guard) = self.run_lock.try_lock() else {
            tracing::info!("scheduler: sweep already running; skipping");
            return None;
        };
        if self.stop.is_raised() {
            tracing::debug!("scheduler: stop requested; not starting sweep");
            return None;
        }

        self.set_state(SweepState::Running);
        let report = self.engine.run(&self.stop).await;
        self.set_state(match report.status {
            SweepStatus::Completed => SweepState::Completed,
            SweepStatus::Aborted => SweepState::Aborted,
        });
        Some(report)
    }

    fn set_state(&self, state: SweepState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

pub struct Scheduler {
    runner: Arc<SweepRunner>,
    jobs: tokio::sync::Mutex<Option<JobScheduler>>,
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    #[must_use]
    pub fn new(engine: SweepEngine) -> Self {
        Self {
            runner: Arc::new(SweepRunner {
                engine,
                run_lock: tokio::sync::Mutex::new(()),
                stop: StopSignal::new(),
                state: Mutex::new(SweepState::Idle),
            }),
            jobs: tokio::sync::Mutex::new(None),
        }
    }

    /// Starts sweeping every `interval`; the first sweep fires one interval
    /// from now. Calling this while already started is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::ZeroInterval`] for a zero interval, or
    /// [`SweepError::Scheduler`] if the job scheduler cannot be started.
    pub async fn start(&self, interval: Duration) -> Result<(), SweepError> {
        if interval.is_zero() {
            return Err(SweepError::ZeroInterval);
        }

        let mut jobs = self.jobs.lock().await;
        if jobs.is_some() {
            tracing::debug!("scheduler: already started");
            return Ok(());
        }
        self.runner.stop.reset();

        let scheduler = JobScheduler::new().await?;
        let runner = Arc::clone(&self.runner);
        let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
            let runner = Arc::clone(&runner);
            Box::pin(async move {
                runner.run_exclusive().await;
            })
        })?;
        scheduler.add(job).await?;
        scheduler.start().await?;
        *jobs = Some(scheduler);

        tracing::info!(interval_secs = interval.as_secs(), "scheduler: started");
        Ok(())
    }

    /// [`start`](Self::start) with the interval given in hours.
    ///
    /// # Errors
    ///
    /// Same as [`start`](Self::start).
    pub async fn start_hours(&self, hours: u64) -> Result<(), SweepError> {
        self.start(Duration::from_secs(hours.saturating_mul(3600)))
            .await
    }

    /// Cancels future ticks and asks an in-flight sweep to stop at its next
    /// item boundary. Returns once no sweep is running.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::Scheduler`] if the job scheduler fails to shut
    /// down. The in-flight sweep is still awaited first.
    pub async fn stop(&self) -> Result<(), SweepError> {
        self.runner.stop.raise();

        let shutdown = match self.jobs.lock().await.take() {
            Some(mut scheduler) => scheduler.shutdown().await,
            None => Ok(()),
        };

        let _idle = self.runner.run_lock.lock().await;
        tracing::info!("scheduler: stopped");
        shutdown.map_err(SweepError::from)
    }

    /// Runs one sweep immediately under the run-lock.
    ///
    /// Returns `None` when a sweep is already running or a stop was
    /// requested.
    pub async fn run_now(&self) -> Option<SweepReport> {
        self.runner.run_exclusive().await
    }

    #[must_use]
    pub fn state(&self) -> SweepState {
        *self
            .runner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
