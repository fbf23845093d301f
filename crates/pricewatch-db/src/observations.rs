//! Database operations for the append-only `price_observations` history.

use chrono::{DateTime, Utc};
use pricewatch_core::{NewObservation, PriceObservation};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `price_observations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ObservationRow {
    pub id: i64,
    pub item_id: i64,
    pub price: f64,
    pub observed_at: DateTime<Utc>,
    pub is_on_sale: bool,
    pub original_price: Option<f64>,
}

impl From<ObservationRow> for PriceObservation {
    fn from(row: ObservationRow) -> Self {
        Self {
            id: row.id,
            item_id: row.item_id,
            price: row.price,
            observed_at: row.observed_at,
            is_on_sale: row.is_on_sale,
            original_price: row.original_price,
        }
    }
}

/// Returns the most recent observation for an item, if one exists.
///
/// Ordered by `observed_at DESC, id DESC` so that the first row is always the
/// latest, even when several observations share a timestamp.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_observation(
    pool: &PgPool,
    item_id: i64,
) -> Result<Option<ObservationRow>, DbError> {
    let row = sqlx::query_as::<_, ObservationRow>(
        "SELECT id, item_id, price, observed_at, is_on_sale, original_price \
         FROM price_observations \
         WHERE item_id = $1 \
         ORDER BY observed_at DESC, id DESC \
         LIMIT 1",
    )
    .bind(item_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Appends one observation. Accepts a pool or an open transaction.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] when `item_id` does not exist, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn append_observation<'e, E>(
    executor: E,
    item_id: i64,
    observation: &NewObservation,
) -> Result<ObservationRow, DbError>
where
    E: sqlx::PgExecutor<'e>,
{
    let result = sqlx::query_as::<_, ObservationRow>(
        "INSERT INTO price_observations \
             (item_id, price, observed_at, is_on_sale, original_price) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, item_id, price, observed_at, is_on_sale, original_price",
    )
    .bind(item_id)
    .bind(observation.price)
    .bind(observation.observed_at)
    .bind(observation.is_on_sale)
    .bind(observation.original_price)
    .fetch_one(executor)
    .await;

    match result {
        Ok(row) => Ok(row),
        Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => {
            Err(DbError::NotFound(item_id))
        }
        Err(e) => Err(e.into()),
    }
}

/// Lists every observation for an item, oldest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_observations(
    pool: &PgPool,
    item_id: i64,
) -> Result<Vec<ObservationRow>, DbError> {
    let rows = sqlx::query_as::<_, ObservationRow>(
        "SELECT id, item_id, price, observed_at, is_on_sale, original_price \
         FROM price_observations \
         WHERE item_id = $1 \
         ORDER BY observed_at ASC, id ASC",
    )
    .bind(item_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
