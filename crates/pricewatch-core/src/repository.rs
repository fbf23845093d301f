use async_trait::async_trait;
use thiserror::Error;

use crate::items::{NewObservation, NewTrackedItem, PriceObservation, TrackedItem};

/// Storage failure surfaced through [`Repository`] and [`TrackingAdmin`].
///
/// Backends map their native errors into this type by message so the core
/// crates stay free of any database dependency.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("tracked item {0} not found")]
    NotFound(i64),

    #[error("item already tracked: {0}")]
    Duplicate(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// The storage contract consumed by the sweep engine.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Items with `is_tracked = true`, ordered by id.
    async fn list_tracked(&self) -> Result<Vec<TrackedItem>, PersistenceError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<TrackedItem>, PersistenceError>;

    /// Persists the price/status fields of `item`.
    ///
    /// Implementations must not overwrite the stored alert threshold, and must
    /// store `alert_triggered = false` whenever the stored threshold is null.
    async fn save(&self, item: &TrackedItem) -> Result<(), PersistenceError>;

    /// Most recent observation by timestamp, ties broken by id.
    async fn latest_observation(
        &self,
        item_id: i64,
    ) -> Result<Option<PriceObservation>, PersistenceError>;

    async fn append_observation(
        &self,
        item_id: i64,
        observation: &NewObservation,
    ) -> Result<PriceObservation, PersistenceError>;
}

/// Item and alert management used by the command-line front end.
#[async_trait]
pub trait TrackingAdmin: Send + Sync {
    /// Inserts a tracked item and its initial observation.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Duplicate`] when the URL is already stored.
    async fn create_item(&self, item: &NewTrackedItem) -> Result<TrackedItem, PersistenceError>;

    async fn find_by_url(&self, url: &str) -> Result<Option<TrackedItem>, PersistenceError>;

    /// All items, tracked or not, ordered by id.
    async fn list_items(&self) -> Result<Vec<TrackedItem>, PersistenceError>;

    /// Observations for one item, oldest first.
    async fn list_observations(
        &self,
        item_id: i64,
    ) -> Result<Vec<PriceObservation>, PersistenceError>;

    async fn set_tracked(&self, id: i64, tracked: bool) -> Result<(), PersistenceError>;

    /// Sets or removes the alert threshold. Either way the latch is reset.
    async fn set_alert_threshold(
        &self,
        id: i64,
        threshold: Option<f64>,
    ) -> Result<(), PersistenceError>;

    /// Resets the alert latch, keeping the threshold.
    async fn clear_alert(&self, id: i64) -> Result<(), PersistenceError>;
}
