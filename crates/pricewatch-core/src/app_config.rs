use std::path::PathBuf;

use crate::ConfigError;

#[derive(Clone)]
pub struct AppConfig {
    /// Only commands that touch storage need it.
    pub database_url: Option<String>,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Hours between scheduled sweeps. Always greater than zero.
    pub check_interval_hours: u64,
    pub request_timeout_ms: u64,
    /// Total fetch attempts per request, including the first one.
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    /// Upper bound of the randomized delay applied before the first attempt.
    pub initial_jitter_ms: u64,
    pub synthetic_fallback_enabled: bool,
    pub sweep_concurrency: usize,
    pub user_agent: String,
    /// Optional YAML file with per-site request header overrides.
    pub sites_path: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("log_level", &self.log_level)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("check_interval_hours", &self.check_interval_hours)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("initial_jitter_ms", &self.initial_jitter_ms)
            .field(
                "synthetic_fallback_enabled",
                &self.synthetic_fallback_enabled,
            )
            .field("sweep_concurrency", &self.sweep_concurrency)
            .field("user_agent", &self.user_agent)
            .field("sites_path", &self.sites_path)
            .finish()
    }
}

impl AppConfig {
    /// The configured Postgres URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `DATABASE_URL` was not set.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
    }
}
