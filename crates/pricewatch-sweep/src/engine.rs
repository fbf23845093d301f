//! One pass over every tracked item.
//!
//! Per item: check, diff against the latest observation, append on change,
//! persist the heartbeat fields, latch the alert. Check failures are counted
//! and never stop the sweep; any persistence failure aborts it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use pricewatch_core::{
    NewObservation, PersistenceError, Repository, SweepReport, SweepSink, SweepStatus,
    SweepSummary, TrackedItem,
};
use uuid::Uuid;

use crate::{alert, diff, ItemChecker};

/// Cooperative stop request shared between a scheduler and running sweeps.
///
/// Checked before each item starts; in-flight items always finish.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

enum ItemOutcome {
    /// Not started because of a stop request.
    Cancelled,
    /// Not started because an earlier item hit a persistence failure.
    Abandoned,
    Failed,
    Checked { updated: bool, alert: bool },
}

pub struct SweepEngine {
    repository: Arc<dyn Repository>,
    checker: Arc<dyn ItemChecker>,
    sink: Arc<dyn SweepSink>,
    concurrency: usize,
}

impl std::fmt::Debug for SweepEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepEngine")
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl SweepEngine {
    #[must_use]
    pub fn new(
        repository: Arc<dyn Repository>,
        checker: Arc<dyn ItemChecker>,
        sink: Arc<dyn SweepSink>,
        concurrency: usize,
    ) -> Self {
        Self {
            repository,
            checker,
            sink,
            concurrency: concurrency.max(1),
        }
    }

    /// Runs one sweep and hands the report to the sink.
    ///
    /// Never fails: an aborted sweep is reported with
    /// [`SweepStatus::Aborted`], and sink failures are only logged.
    pub async fn run(&self, stop: &StopSignal) -> SweepReport {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        tracing::info!(%run_id, concurrency = self.concurrency, "sweep: starting");

        let (summary, failure) = match self.repository.list_tracked().await {
            Ok(items) => self.process_all(run_id, items, stop).await,
            Err(e) => (SweepSummary::default(), Some(e)),
        };

        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = started.elapsed().as_millis() as u64;
        let report = SweepReport {
            run_id,
            status: if failure.is_some() {
                SweepStatus::Aborted
            } else {
                SweepStatus::Completed
            },
            summary: SweepSummary {
                duration_ms,
                ..summary
            },
            error: failure.map(|e| e.to_string()),
        };

        if let Err(e) = self.sink.record(&report).await {
            tracing::warn!(%run_id, error = %e, "sweep: failed to record report");
        }
        report
    }

    async fn process_all(
        &self,
        run_id: Uuid,
        items: Vec<TrackedItem>,
        stop: &StopSignal,
    ) -> (SweepSummary, Option<PersistenceError>) {
        tracing::info!(%run_id, items = items.len(), "sweep: loaded tracked items");
        let aborting = AtomicBool::new(false);

        let outcomes: Vec<Result<ItemOutcome, PersistenceError>> = stream::iter(items)
            .map(|item| {
                let aborting = &aborting;
                async move {
                    if aborting.load(Ordering::SeqCst) {
                        return Ok(ItemOutcome::Abandoned);
                    }
                    if stop.is_raised() {
                        return Ok(ItemOutcome::Cancelled);
                    }
                    let outcome = self.process_item(run_id, item).await;
                    if outcome.is_err() {
                        aborting.store(true, Ordering::SeqCst);
                    }
                    outcome
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut summary = SweepSummary::default();
        let mut failure = None;
        for outcome in outcomes {
            match outcome {
                Ok(ItemOutcome::Cancelled) => summary.cancelled = true,
                Ok(ItemOutcome::Abandoned) => {}
                Ok(ItemOutcome::Failed) => {
                    summary.checked += 1;
                    summary.errors += 1;
                }
                Ok(ItemOutcome::Checked { updated, alert }) => {
                    summary.checked += 1;
                    summary.updated += u32::from(updated);
                    summary.alerts_triggered += u32::from(alert);
                }
                Err(e) => {
                    summary.checked += 1;
                    failure.get_or_insert(e);
                }
            }
        }
        (summary, failure)
    }

    async fn process_item(
        &self,
        run_id: Uuid,
        item: TrackedItem,
    ) -> Result<ItemOutcome, PersistenceError> {
        let fresh = match self.checker.check(&item).await {
            Ok(fresh) => fresh,
            Err(e) => {
                tracing::warn!(
                    %run_id,
                    item_id = item.id,
                    url = %item.source_url,
                    site = %item.site,
                    error = %e,
                    "sweep: item check failed"
                );
                return Ok(ItemOutcome::Failed);
            }
        };

        let now = Utc::now();
        let latest = self.repository.latest_observation(item.id).await?;
        let updated = diff::price_changed(latest.as_ref(), &item, &fresh);
        if updated {
            self.repository
                .append_observation(item.id, &NewObservation::from_extracted(&fresh, now))
                .await?;
            tracing::debug!(
                %run_id,
                item_id = item.id,
                price = fresh.price,
                is_on_sale = fresh.is_on_sale,
                "sweep: recorded price change"
            );
        }

        let mut next = item;
        next.record_check(&fresh, now);
        let alert = alert::should_trigger(&next, fresh.price);
        if alert {
            next.alert_triggered = true;
            tracing::info!(
                %run_id,
                item_id = next.id,
                name = %next.display_name,
                price = fresh.price,
                threshold = next.alert_threshold,
                "sweep: price alert triggered"
            );
        }

        self.repository.save(&next).await?;
        Ok(ItemOutcome::Checked { updated, alert })
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
