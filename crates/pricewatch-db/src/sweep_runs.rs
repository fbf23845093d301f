//! Database operations for `sweep_runs`.

use chrono::{DateTime, Utc};
use pricewatch_core::SweepReport;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `sweep_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SweepRunRow {
    pub id: i64,
    pub run_id: Uuid,
    pub status: String,
    pub checked: i32,
    pub updated: i32,
    pub alerts_triggered: i32,
    pub errors: i32,
    pub cancelled: bool,
    pub duration_ms: i64,
    pub error_message: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Records one finished sweep.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including when `run_id` was
/// already recorded.
pub async fn record_sweep_run(pool: &PgPool, report: &SweepReport) -> Result<i64, DbError> {
    let summary = &report.summary;
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO sweep_runs \
             (run_id, status, checked, updated, alerts_triggered, errors, \
              cancelled, duration_ms, error_message) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING id",
    )
    .bind(report.run_id)
    .bind(report.status.to_string())
    .bind(to_i32(summary.checked))
    .bind(to_i32(summary.updated))
    .bind(to_i32(summary.alerts_triggered))
    .bind(to_i32(summary.errors))
    .bind(summary.cancelled)
    .bind(i64::try_from(summary.duration_ms).unwrap_or(i64::MAX))
    .bind(&report.error)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns the most recent sweeps, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_sweep_runs(pool: &PgPool, limit: i64) -> Result<Vec<SweepRunRow>, DbError> {
    let rows = sqlx::query_as::<_, SweepRunRow>(
        "SELECT id, run_id, status, checked, updated, alerts_triggered, errors, \
                cancelled, duration_ms, error_message, recorded_at \
         FROM sweep_runs \
         ORDER BY recorded_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
