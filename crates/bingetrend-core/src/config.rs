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

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// config pointed at a local agent service.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
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

    let api_url = require_scheme(
        "BINGETREND_API_URL",
        or_default("BINGETREND_API_URL", "http://localhost:8000"),
        &["http://", "https://"],
    )?;
    let logs_ws_url = require_scheme(
        "BINGETREND_LOGS_WS_URL",
        or_default("BINGETREND_LOGS_WS_URL", "ws://localhost:8000/ws/logs"),
        &["ws://", "wss://"],
    )?;
    let agent_timeout_secs = parse_u64("BINGETREND_AGENT_TIMEOUT_SECS", "300")?;
    let user_agent = or_default("BINGETREND_USER_AGENT", "bingetrend/0.1 (trend-analysis)");
    let log_level = or_default("BINGETREND_LOG_LEVEL", "info");

    // A blank key is treated the same as an absent one.
    let tmdb_api_key = lookup("TMDB_API_KEY")
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());
    let tmdb_base_url = require_scheme(
        "BINGETREND_TMDB_BASE_URL",
        or_default("BINGETREND_TMDB_BASE_URL", "https://api.themoviedb.org/3"),
        &["http://", "https://"],
    )?;
    let tmdb_image_base_url = or_default(
        "BINGETREND_TMDB_IMAGE_BASE_URL",
        "https://image.tmdb.org/t/p",
    );
    let tmdb_timeout_secs = parse_u64("BINGETREND_TMDB_TIMEOUT_SECS", "15")?;
    let tmdb_max_retries = parse_u32("BINGETREND_TMDB_MAX_RETRIES", "2")?;
    let tmdb_retry_backoff_base_ms = parse_u64("BINGETREND_TMDB_RETRY_BACKOFF_BASE_MS", "500")?;

    if agent_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "BINGETREND_AGENT_TIMEOUT_SECS must be greater than zero".to_string(),
        ));
    }

    Ok(AppConfig {
        api_url,
        logs_ws_url,
        agent_timeout_secs,
        user_agent,
        log_level,
        tmdb_api_key,
        tmdb_base_url,
        tmdb_image_base_url,
        tmdb_timeout_secs,
        tmdb_max_retries,
        tmdb_retry_backoff_base_ms,
    })
}

/// Rejects URLs whose scheme is not one of `schemes`.
fn require_scheme(var: &str, raw: String, schemes: &[&str]) -> Result<String, ConfigError> {
    let lower = raw.to_ascii_lowercase();
    if schemes.iter().any(|s| lower.starts_with(s)) {
        Ok(raw.trim_end_matches('/').to_string())
    } else {
        Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("\"{raw}\" must start with one of: {}", schemes.join(", ")),
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
