//! Postgres implementations of the core storage traits.

use async_trait::async_trait;
use chrono::Utc;
use pricewatch_core::{
    NewObservation, NewTrackedItem, PersistenceError, PriceObservation, Repository, SweepReport,
    SweepSink, TrackedItem, TrackingAdmin,
};
use sqlx::PgPool;

use crate::{items, observations, sweep_runs};

#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn list_tracked(&self) -> Result<Vec<TrackedItem>, PersistenceError> {
        let rows = items::list_tracked_items(&self.pool).await?;
        Ok(rows.into_iter().map(TrackedItem::from).collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<TrackedItem>, PersistenceError> {
        Ok(items::get_item(&self.pool, id).await?.map(TrackedItem::from))
    }

    async fn save(&self, item: &TrackedItem) -> Result<(), PersistenceError> {
        items::save_item_state(&self.pool, item).await?;
        Ok(())
    }

    async fn latest_observation(
        &self,
        item_id: i64,
    ) -> Result<Option<PriceObservation>, PersistenceError> {
        Ok(observations::latest_observation(&self.pool, item_id)
            .await?
            .map(PriceObservation::from))
    }

    async fn append_observation(
        &self,
        item_id: i64,
        observation: &NewObservation,
    ) -> Result<PriceObservation, PersistenceError> {
        let row = observations::append_observation(&self.pool, item_id, observation).await?;
        Ok(row.into())
    }
}

#[async_trait]
impl TrackingAdmin for PgRepository {
    async fn create_item(&self, item: &NewTrackedItem) -> Result<TrackedItem, PersistenceError> {
        let row = items::create_item(&self.pool, item, Utc::now()).await?;
        tracing::info!(item_id = row.id, url = %row.source_url, "db: item tracked");
        Ok(row.into())
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<TrackedItem>, PersistenceError> {
        Ok(items::find_item_by_url(&self.pool, url)
            .await?
            .map(TrackedItem::from))
    }

    async fn list_items(&self) -> Result<Vec<TrackedItem>, PersistenceError> {
        let rows = items::list_items(&self.pool).await?;
        Ok(rows.into_iter().map(TrackedItem::from).collect())
    }

    async fn list_observations(
        &self,
        item_id: i64,
    ) -> Result<Vec<PriceObservation>, PersistenceError> {
        let rows = observations::list_observations(&self.pool, item_id).await?;
        Ok(rows.into_iter().map(PriceObservation::from).collect())
    }

    async fn set_tracked(&self, id: i64, tracked: bool) -> Result<(), PersistenceError> {
        items::set_tracked(&self.pool, id, tracked).await?;
        Ok(())
    }

    async fn set_alert_threshold(
        &self,
        id: i64,
        threshold: Option<f64>,
    ) -> Result<(), PersistenceError> {
        items::set_alert_threshold(&self.pool, id, threshold).await?;
        Ok(())
    }

    async fn clear_alert(&self, id: i64) -> Result<(), PersistenceError> {
        items::clear_alert(&self.pool, id).await?;
        Ok(())
    }
}

/// Writes every [`SweepReport`] to the `sweep_runs` table.
#[derive(Debug, Clone)]
pub struct PgSweepSink {
    pool: PgPool,
}

impl PgSweepSink {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SweepSink for PgSweepSink {
    async fn record(&self, report: &SweepReport) -> Result<(), PersistenceError> {
        sweep_runs::record_sweep_run(&self.pool, report).await?;
        Ok(())
    }
}
