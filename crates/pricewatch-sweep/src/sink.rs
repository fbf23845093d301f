//! Sweep report sinks.

use std::sync::Arc;

use async_trait::async_trait;
use pricewatch_core::{PersistenceError, SweepReport, SweepSink, SweepStatus};

/// Emits each report as a structured log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl SweepSink for TracingSink {
    async fn record(&self, report: &SweepReport) -> Result<(), PersistenceError> {
        let s = &report.summary;
        match report.status {
            SweepStatus::Completed => tracing::info!(
                run_id = %report.run_id,
                checked = s.checked,
                updated = s.updated,
                alerts_triggered = s.alerts_triggered,
                errors = s.errors,
                duration_ms = s.duration_ms,
                cancelled = s.cancelled,
                "sweep: completed"
            ),
            SweepStatus::Aborted => tracing::error!(
                run_id = %report.run_id,
                checked = s.checked,
                updated = s.updated,
                errors = s.errors,
                duration_ms = s.duration_ms,
                error = report.error.as_deref().unwrap_or("unknown"),
                "sweep: aborted"
            ),
        }
        Ok(())
    }
}

/// Forwards every report to each inner sink in order.
///
/// All sinks are attempted; the first failure is returned.
#[derive(Clone, Default)]
pub struct CompositeSink {
    sinks: Vec<Arc<dyn SweepSink>>,
}

impl CompositeSink {
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn SweepSink>>) -> Self {
        Self { sinks }
    }
}

#[async_trait]
impl SweepSink for CompositeSink {
    async fn record(&self, report: &SweepReport) -> Result<(), PersistenceError> {
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(e) = sink.record(report).await {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
