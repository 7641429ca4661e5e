use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function,
/// so parsing can be tested against a plain `HashMap`.
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

    let log_level = or_default("LOTPRICE_LOG_LEVEL", "info");
    let profile_path = lookup("LOTPRICE_PROFILE_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let request_timeout_secs = parse_u64("LOTPRICE_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "LOTPRICE_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let user_agent = or_default("LOTPRICE_USER_AGENT", "lotprice/0.1 (final-price-calculator)");
    let max_retries = parse_u32("LOTPRICE_MAX_RETRIES", "3")?;
    let retry_backoff_base_secs = parse_u64("LOTPRICE_RETRY_BACKOFF_BASE_SECS", "2")?;
    let settle_delay_ms = parse_u64("LOTPRICE_SETTLE_DELAY_MS", "1000")?;

    let watch_interval_secs = parse_u64("LOTPRICE_WATCH_INTERVAL_SECS", "60")?;
    if watch_interval_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "LOTPRICE_WATCH_INTERVAL_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(AppConfig {
        log_level,
        profile_path,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        settle_delay_ms,
        watch_interval_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
