//! In-memory storage with the same contract as [`PgRepository`](crate::PgRepository).
//!
//! Used by tests and dry runs. Writes can be made to fail on demand to
//! exercise abort paths.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use pricewatch_core::{
    NewObservation, NewTrackedItem, PersistenceError, PriceObservation, Repository, SweepReport,
    SweepSink, TrackedItem, TrackingAdmin,
};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    items: Vec<TrackedItem>,
    observations: Vec<PriceObservation>,
    reports: Vec<SweepReport>,
    next_item_id: i64,
    next_observation_id: i64,
}

impl State {
    fn item_mut(&mut self, id: i64) -> Result<&mut TrackedItem, PersistenceError> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(PersistenceError::NotFound(id))
    }

    fn push_observation(&mut self, item_id: i64, observation: &NewObservation) -> PriceObservation {
        self.next_observation_id += 1;
        let stored = PriceObservation {
            id: self.next_observation_id,
            item_id,
            price: observation.price,
            observed_at: observation.observed_at,
            is_on_sale: observation.is_on_sale,
            original_price: observation.original_price,
        };
        self.observations.push(stored.clone());
        stored
    }
}

#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
    fail_writes: AtomicBool,
}

impl MemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `item` as-is, keeping its id. Later generated ids stay above it.
    pub async fn insert(&self, item: TrackedItem) {
        let mut state = self.state.lock().await;
        state.next_item_id = state.next_item_id.max(item.id);
        state.items.retain(|existing| existing.id != item.id);
        state.items.push(item);
        state.items.sort_by_key(|existing| existing.id);
    }

    /// While set, every write returns [`PersistenceError::Storage`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn observations(&self, item_id: i64) -> Vec<PriceObservation> {
        let state = self.state.lock().await;
        state
            .observations
            .iter()
            .filter(|o| o.item_id == item_id)
            .cloned()
            .collect()
    }

    /// Reports received through the [`SweepSink`] implementation.
    pub async fn reports(&self) -> Vec<SweepReport> {
        self.state.lock().await.reports.clone()
    }

    fn check_writable(&self) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Storage(
                "memory repository is failing writes".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_tracked(&self) -> Result<Vec<TrackedItem>, PersistenceError> {
        let state = self.state.lock().await;
        Ok(state
            .items
            .iter()
            .filter(|item| item.is_tracked)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<TrackedItem>, PersistenceError> {
        let state = self.state.lock().await;
        Ok(state.items.iter().find(|item| item.id == id).cloned())
    }

    async fn save(&self, item: &TrackedItem) -> Result<(), PersistenceError> {
        self.check_writable()?;
        let mut state = self.state.lock().await;
        let stored = state.item_mut(item.id)?;
        stored.last_known_price = item.last_known_price;
        stored.is_on_sale = item.is_on_sale;
        stored.original_price = item.original_price;
        stored.last_check_at = stored.last_check_at.max(item.last_check_at);
        stored.alert_triggered = item.alert_triggered && stored.alert_threshold.is_some();
        Ok(())
    }

    async fn latest_observation(
        &self,
        item_id: i64,
    ) -> Result<Option<PriceObservation>, PersistenceError> {
        let state = self.state.lock().await;
        Ok(state
            .observations
            .iter()
            .filter(|o| o.item_id == item_id)
            .max_by_key(|o| (o.observed_at, o.id))
            .cloned())
    }

    async fn append_observation(
        &self,
        item_id: i64,
        observation: &NewObservation,
    ) -> Result<PriceObservation, PersistenceError> {
        self.check_writable()?;
        let mut state = self.state.lock().await;
        state.item_mut(item_id)?;
        Ok(state.push_observation(item_id, observation))
    }
}

#[async_trait]
impl TrackingAdmin for MemoryRepository {
    async fn create_item(&self, item: &NewTrackedItem) -> Result<TrackedItem, PersistenceError> {
        self.check_writable()?;
        let mut state = self.state.lock().await;
        if state.items.iter().any(|i| i.source_url == item.source_url) {
            return Err(PersistenceError::Duplicate(item.source_url.clone()));
        }

        let now = Utc::now();
        state.next_item_id += 1;
        let created = TrackedItem {
            id: state.next_item_id,
            source_url: item.source_url.clone(),
            site: item.site.clone(),
            display_name: item.display_name.clone(),
            last_known_price: Some(item.price),
            last_check_at: now,
            is_on_sale: item.is_on_sale,
            original_price: item.original_price,
            is_tracked: true,
            alert_threshold: None,
            alert_triggered: false,
        };
        state.items.push(created.clone());
        state.push_observation(
            created.id,
            &NewObservation {
                price: item.price,
                observed_at: now,
                is_on_sale: item.is_on_sale,
                original_price: item.original_price,
            },
        );
        Ok(created)
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<TrackedItem>, PersistenceError> {
        let state = self.state.lock().await;
        Ok(state.items.iter().find(|i| i.source_url == url).cloned())
    }

    async fn list_items(&self) -> Result<Vec<TrackedItem>, PersistenceError> {
        Ok(self.state.lock().await.items.clone())
    }

    async fn list_observations(
        &self,
        item_id: i64,
    ) -> Result<Vec<PriceObservation>, PersistenceError> {
        let mut observations = self.observations(item_id).await;
        observations.sort_by_key(|o| (o.observed_at, o.id));
        Ok(observations)
    }

    async fn set_tracked(&self, id: i64, tracked: bool) -> Result<(), PersistenceError> {
        self.check_writable()?;
        self.state.lock().await.item_mut(id)?.is_tracked = tracked;
        Ok(())
    }

    async fn set_alert_threshold(
        &self,
        id: i64,
        threshold: Option<f64>,
    ) -> Result<(), PersistenceError> {
        self.check_writable()?;
        let mut state = self.state.lock().await;
        let item = state.item_mut(id)?;
        item.alert_threshold = threshold;
        item.alert_triggered = false;
        Ok(())
    }

    async fn clear_alert(&self, id: i64) -> Result<(), PersistenceError> {
        self.check_writable()?;
        self.state.lock().await.item_mut(id)?.alert_triggered = false;
        Ok(())
    }
}

#[async_trait]
impl SweepSink for MemoryRepository {
    async fn record(&self, report: &SweepReport) -> Result<(), PersistenceError> {
        self.check_writable()?;
        self.state.lock().await.reports.push(report.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn new_item(url: &str, price: f64) -> NewTrackedItem {
        NewTrackedItem {
            source_url: url.to_string(),
            site: "alza".to_string(),
            display_name: "Phone".to_string(),
            price,
            is_on_sale: false,
            original_price: None,
        }
    }

    #[tokio::test]
    async fn create_item_records_initial_observation() {
        let repo = MemoryRepository::new();
        let item = repo
            .create_item(&new_item("https://www.alza.cz/a", 1000.0))
            .await
            .unwrap();

        assert_eq!(item.id, 1);
        assert_eq!(item.last_known_price, Some(1000.0));
        let history = repo.list_observations(item.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!((history[0].price - 1000.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn create_item_rejects_duplicate_url() {
        let repo = MemoryRepository::new();
        repo.create_item(&new_item("https://www.alza.cz/a", 1.0))
            .await
            .unwrap();
        let err = repo
            .create_item(&new_item("https://www.alza.cz/a", 2.0))
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Duplicate(_)), "{err:?}");
    }

    #[tokio::test]
    async fn save_keeps_threshold_and_drops_orphan_latch() {
        let repo = MemoryRepository::new();
        let created = repo
            .create_item(&new_item("https://www.alza.cz/a", 1000.0))
            .await
            .unwrap();

        // The sweep saw a threshold that was removed in the meantime.
        let mut snapshot = created.clone();
        snapshot.alert_threshold = Some(900.0);
        snapshot.alert_triggered = true;
        snapshot.last_known_price = Some(850.0);
        repo.save(&snapshot).await.unwrap();

        let stored = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.alert_threshold, None);
        assert!(!stored.alert_triggered);
        assert_eq!(stored.last_known_price, Some(850.0));
    }

    #[tokio::test]
    async fn save_never_moves_last_check_backwards() {
        let repo = MemoryRepository::new();
        let created = repo
            .create_item(&new_item("https://www.alza.cz/a", 1000.0))
            .await
            .unwrap();

        let mut stale = created.clone();
        stale.last_check_at = created.last_check_at - Duration::hours(2);
        repo.save(&stale).await.unwrap();

        let stored = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.last_check_at, created.last_check_at);
    }

    #[tokio::test]
    async fn threshold_changes_reset_the_latch() {
        let repo = MemoryRepository::new();
        let created = repo
            .create_item(&new_item("https://www.alza.cz/a", 1000.0))
            .await
            .unwrap();
        repo.set_alert_threshold(created.id, Some(900.0))
            .await
            .unwrap();

        let mut latched = repo.get_by_id(created.id).await.unwrap().unwrap();
        latched.alert_triggered = true;
        repo.save(&latched).await.unwrap();
        assert!(repo.get_by_id(created.id).await.unwrap().unwrap().alert_triggered);

        repo.clear_alert(created.id).await.unwrap();
        let cleared = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert!(!cleared.alert_triggered);
        assert_eq!(cleared.alert_threshold, Some(900.0));
    }

    #[tokio::test]
    async fn untracked_items_are_not_listed_for_sweeps() {
        let repo = MemoryRepository::new();
        let a = repo
            .create_item(&new_item("https://www.alza.cz/a", 1.0))
            .await
            .unwrap();
        repo.create_item(&new_item("https://www.alza.cz/b", 2.0))
            .await
            .unwrap();
        repo.set_tracked(a.id, false).await.unwrap();

        let tracked = repo.list_tracked().await.unwrap();
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked[0].source_url, "https://www.alza.cz/b");
        assert_eq!(repo.list_items().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn latest_observation_breaks_ties_by_id() {
        let repo = MemoryRepository::new();
        let created = repo
            .create_item(&new_item("https://www.alza.cz/a", 1000.0))
            .await
            .unwrap();
        let at = created.last_check_at;
        repo.append_observation(
            created.id,
            &NewObservation {
                price: 900.0,
                observed_at: at,
                is_on_sale: true,
                original_price: Some(1000.0),
            },
        )
        .await
        .unwrap();

        let latest = repo.latest_observation(created.id).await.unwrap().unwrap();
        assert!((latest.price - 900.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn failing_writes_surface_storage_errors() {
        let repo = MemoryRepository::new();
        repo.set_fail_writes(true);
        let err = repo
            .create_item(&new_item("https://www.alza.cz/a", 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Storage(_)));
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let repo = MemoryRepository::new();
        assert!(matches!(
            repo.set_tracked(42, false).await,
            Err(PersistenceError::NotFound(42))
        ));
        assert!(matches!(
            repo.clear_alert(42).await,
            Err(PersistenceError::NotFound(42))
        ));
    }
}
