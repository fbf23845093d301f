//! Offline unit tests for pricewatch-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::Utc;
use pricewatch_core::{AppConfig, ConfigError, PriceObservation, TrackedItem};
use pricewatch_db::{DbError, ObservationRow, PoolConfig, SweepRunRow, TrackedItemRow};
use uuid::Uuid;

fn app_config() -> AppConfig {
    AppConfig {
        database_url: Some("postgres://example".to_string()),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        check_interval_hours: 4,
        request_timeout_ms: 30_000,
        max_retries: 3,
        retry_backoff_base_ms: 2_000,
        initial_jitter_ms: 500,
        synthetic_fallback_enabled: false,
        sweep_concurrency: 4,
        user_agent: "ua".to_string(),
        sites_path: None,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[tokio::test]
async fn connecting_without_database_url_is_a_config_error() {
    let config = AppConfig {
        database_url: None,
        ..app_config()
    };
    let err = pricewatch_db::connect_pool_from_config(&config)
        .await
        .err()
        .expect("no URL to connect to");
    assert!(
        matches!(err, DbError::Config(ConfigError::MissingEnvVar(ref v)) if v == "DATABASE_URL"),
        "{err}"
    );
}

#[test]
fn tracked_item_row_converts_into_domain_item() {
    let now = Utc::now();
    let row = TrackedItemRow {
        id: 3,
        source_url: "https://allegro.pl/oferta/1".to_string(),
        site: "allegro".to_string(),
        display_name: "Kabel USB".to_string(),
        last_known_price: Some(29.99),
        last_check_at: now,
        is_on_sale: true,
        original_price: Some(39.99),
        is_tracked: true,
        alert_threshold: Some(25.0),
        alert_triggered: false,
    };

    let item = TrackedItem::from(row);
    assert_eq!(item.id, 3);
    assert_eq!(item.site, "allegro");
    assert_eq!(item.last_known_price, Some(29.99));
    assert_eq!(item.original_price, Some(39.99));
    assert_eq!(item.alert_threshold, Some(25.0));
    assert!(item.alert_armed());
}

#[test]
fn observation_row_converts_into_domain_observation() {
    let now = Utc::now();
    let observation = PriceObservation::from(ObservationRow {
        id: 10,
        item_id: 3,
        price: 850.0,
        observed_at: now,
        is_on_sale: false,
        original_price: None,
    });

    assert_eq!(observation.id, 10);
    assert_eq!(observation.item_id, 3);
    assert_eq!(observation.observed_at, now);
    assert!(observation.original_price.is_none());
}

/// Compile-time smoke test: confirm that [`SweepRunRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn sweep_run_row_has_expected_fields() {
    let row = SweepRunRow {
        id: 1_i64,
        run_id: Uuid::new_v4(),
        status: "completed".to_string(),
        checked: 5_i32,
        updated: 2_i32,
        alerts_triggered: 1_i32,
        errors: 0_i32,
        cancelled: false,
        duration_ms: 1234_i64,
        error_message: None,
        recorded_at: Utc::now(),
    };

    assert_eq!(row.status, "completed");
    assert_eq!(row.checked, 5);
    assert!(row.error_message.is_none());
}
