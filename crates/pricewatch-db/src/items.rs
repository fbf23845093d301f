//! Database operations for `tracked_items`.

use chrono::{DateTime, Utc};
use pricewatch_core::{NewObservation, NewTrackedItem, TrackedItem};
use sqlx::PgPool;

use crate::observations::append_observation;
use crate::{is_unique_violation, DbError};

const ITEM_COLUMNS: &str = "id, source_url, site, display_name, last_known_price, last_check_at, \
                            is_on_sale, original_price, is_tracked, alert_threshold, alert_triggered";

/// A row from the `tracked_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrackedItemRow {
    pub id: i64,
    pub source_url: String,
    pub site: String,
    pub display_name: String,
    pub last_known_price: Option<f64>,
    pub last_check_at: DateTime<Utc>,
    pub is_on_sale: bool,
    pub original_price: Option<f64>,
    pub is_tracked: bool,
    pub alert_threshold: Option<f64>,
    pub alert_triggered: bool,
}

impl From<TrackedItemRow> for TrackedItem {
    fn from(row: TrackedItemRow) -> Self {
        Self {
            id: row.id,
            source_url: row.source_url,
            site: row.site,
            display_name: row.display_name,
            last_known_price: row.last_known_price,
            last_check_at: row.last_check_at,
            is_on_sale: row.is_on_sale,
            original_price: row.original_price,
            is_tracked: row.is_tracked,
            alert_threshold: row.alert_threshold,
            alert_triggered: row.alert_triggered,
        }
    }
}

/// Returns all items with `is_tracked = true`, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_tracked_items(pool: &PgPool) -> Result<Vec<TrackedItemRow>, DbError> {
    let rows = sqlx::query_as::<_, TrackedItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM tracked_items WHERE is_tracked = true ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns every item, tracked or not, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_items(pool: &PgPool) -> Result<Vec<TrackedItemRow>, DbError> {
    let rows = sqlx::query_as::<_, TrackedItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM tracked_items ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_item(pool: &PgPool, id: i64) -> Result<Option<TrackedItemRow>, DbError> {
    let row = sqlx::query_as::<_, TrackedItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM tracked_items WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_item_by_url(pool: &PgPool, url: &str) -> Result<Option<TrackedItemRow>, DbError> {
    let row = sqlx::query_as::<_, TrackedItemRow>(&format!(
        "SELECT {ITEM_COLUMNS} FROM tracked_items WHERE source_url = $1"
    ))
    .bind(url)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a tracked item together with its initial observation in a single
/// transaction, so the first sweep diffs against the price seen at tracking
/// time.
///
/// # Errors
///
/// Returns [`DbError::Duplicate`] if the URL is already stored, or
/// [`DbError::Sqlx`] if either insert fails.
pub async fn create_item(
    pool: &PgPool,
    item: &NewTrackedItem,
    observed_at: DateTime<Utc>,
) -> Result<TrackedItemRow, DbError> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query_as::<_, TrackedItemRow>(&format!(
        "INSERT INTO tracked_items \
             (source_url, site, display_name, last_known_price, last_check_at, \
              is_on_sale, original_price) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         RETURNING {ITEM_COLUMNS}"
    ))
    .bind(&item.source_url)
    .bind(&item.site)
    .bind(&item.display_name)
    .bind(item.price)
    .bind(observed_at)
    .bind(item.is_on_sale)
    .bind(item.original_price)
    .fetch_one(&mut *tx)
    .await;

    let row = match inserted {
        Ok(row) => row,
        Err(e) if is_unique_violation(&e) => {
            return Err(DbError::Duplicate(item.source_url.clone()));
        }
        Err(e) => return Err(e.into()),
    };

    let observation = NewObservation {
        price: item.price,
        observed_at,
        is_on_sale: item.is_on_sale,
        original_price: item.original_price,
    };
    append_observation(&mut *tx, row.id, &observation).await?;

    tx.commit().await?;
    Ok(row)
}

/// Persists the price/status fields of a checked item.
///
/// The stored `alert_threshold` is never written here, and the latch is only
/// kept when a threshold is still present, so a threshold removed while a
/// sweep was running cannot leave a latched alert behind. `last_check_at`
/// never moves backwards.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the item does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn save_item_state(pool: &PgPool, item: &TrackedItem) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE tracked_items \
         SET last_known_price = $2, \
             is_on_sale = $3, \
             original_price = $4, \
             last_check_at = GREATEST(last_check_at, $5), \
             alert_triggered = ($6 AND alert_threshold IS NOT NULL), \
             updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(item.id)
    .bind(item.last_known_price)
    .bind(item.is_on_sale)
    .bind(item.original_price)
    .bind(item.last_check_at)
    .bind(item.alert_triggered)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(item.id));
    }
    Ok(())
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if the item does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_tracked(pool: &PgPool, id: i64, tracked: bool) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE tracked_items SET is_tracked = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(tracked)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(id));
    }
    Ok(())
}

/// Sets or removes the alert threshold and resets the latch.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the item does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_alert_threshold(
    pool: &PgPool,
    id: i64,
    threshold: Option<f64>,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE tracked_items \
         SET alert_threshold = $2, alert_triggered = false, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(threshold)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(id));
    }
    Ok(())
}

/// Resets the alert latch, keeping the threshold.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the item does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn clear_alert(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE tracked_items SET alert_triggered = false, updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound(id));
    }
    Ok(())
}
