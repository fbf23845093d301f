use crate::app_config::AppConfig;
use crate::ConfigError;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files; useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation live here, decoupled from the real environment so
/// tests can drive it from a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = lookup("DATABASE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty());
    let log_level = or_default("PRICEWATCH_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("PRICEWATCH_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("PRICEWATCH_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("PRICEWATCH_DB_ACQUIRE_TIMEOUT_SECS", "10")?;
    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRICEWATCH_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        });
    }

    let check_interval_hours = parse_u64("PRICEWATCH_CHECK_INTERVAL_HOURS", "4")?;
    if check_interval_hours == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRICEWATCH_CHECK_INTERVAL_HOURS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let request_timeout_ms = parse_u64("PRICEWATCH_REQUEST_TIMEOUT_MS", "30000")?;
    let max_retries = parse_u32("PRICEWATCH_MAX_RETRIES", "3")?;
    if max_retries == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRICEWATCH_MAX_RETRIES".to_string(),
            reason: "at least one attempt is required".to_string(),
        });
    }
    let retry_backoff_base_ms = parse_u64("PRICEWATCH_RETRY_BACKOFF_BASE_MS", "2000")?;
    let initial_jitter_ms = parse_u64("PRICEWATCH_INITIAL_JITTER_MS", "500")?;
    let synthetic_fallback_enabled = parse_bool(
        "PRICEWATCH_SYNTHETIC_FALLBACK",
        &or_default("PRICEWATCH_SYNTHETIC_FALLBACK", "false"),
    )?;

    let sweep_concurrency = parse_usize("PRICEWATCH_SWEEP_CONCURRENCY", "4")?;
    if sweep_concurrency == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRICEWATCH_SWEEP_CONCURRENCY".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let user_agent = or_default("PRICEWATCH_USER_AGENT", DEFAULT_USER_AGENT);
    let sites_path = lookup("PRICEWATCH_SITES_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    Ok(AppConfig {
        database_url,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        check_interval_hours,
        request_timeout_ms,
        max_retries,
        retry_backoff_base_ms,
        initial_jitter_ms,
        synthetic_fallback_enabled,
        sweep_concurrency,
        user_agent,
        sites_path,
    })
}

/// Parse a boolean flag. Accepts `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`.
fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
