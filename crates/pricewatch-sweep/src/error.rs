use thiserror::Error;
use tokio_cron_scheduler::JobSchedulerError;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("sweep interval must be greater than zero")]
    ZeroInterval,

    #[error("scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),
}
