//! Sweep outcome types and the sink that receives them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repository::PersistenceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepStatus {
    Completed,
    Aborted,
}

impl std::fmt::Display for SweepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweepStatus::Completed => write!(f, "completed"),
            SweepStatus::Aborted => write!(f, "aborted"),
        }
    }
}

/// Counters for one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepSummary {
    /// Items examined, whether the check succeeded or not.
    pub checked: u32,
    /// Items that received a new observation.
    pub updated: u32,
    /// Alerts latched during this sweep.
    pub alerts_triggered: u32,
    /// Per-item failures.
    pub errors: u32,
    pub duration_ms: u64,
    /// `true` when a stop request ended the sweep before every item started.
    pub cancelled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub run_id: Uuid,
    pub status: SweepStatus,
    pub summary: SweepSummary,
    /// Cause of an aborted sweep.
    pub error: Option<String>,
}

/// Observability sink for finished sweeps.
#[async_trait]
pub trait SweepSink: Send + Sync {
    async fn record(&self, report: &SweepReport) -> Result<(), PersistenceError>;
}
