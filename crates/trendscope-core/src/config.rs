use std::str::FromStr;

use crate::app_config::{AppConfig, Environment, DEV_SECRET_KEY};
use crate::ConfigError;

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
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset so `KEY=` in a `.env` file keeps mock mode.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_num = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_value::<u64>(var, &or_default(var, default))
    };

    let env = parse_environment(&or_default("TRENDSCOPE_ENV", "development"))?;

    let database_url = or_default("DATABASE_URL", "sqlite://data/trends.db");
    let bind_addr = parse_value::<SocketAddr>(
        "TRENDSCOPE_BIND_ADDR",
        &or_default("TRENDSCOPE_BIND_ADDR", "127.0.0.1:5000"),
    )?;
    let log_level = or_default("TRENDSCOPE_LOG_LEVEL", "info");

    let secret_key = match optional("TRENDSCOPE_SECRET_KEY") {
        Some(key) => key,
        None if env == Environment::Production => {
            return Err(ConfigError::MissingEnvVar(
                "TRENDSCOPE_SECRET_KEY".to_string(),
            ));
        }
        None => DEV_SECRET_KEY.to_string(),
    };
    let cors_origin = or_default("TRENDSCOPE_CORS_ORIGIN", "http://localhost:8501");

    let youtube_api_key = optional("YOUTUBE_API_KEY");
    let instagram_access_token = optional("INSTAGRAM_ACCESS_TOKEN");
    let youtube_category_id = or_default("TRENDSCOPE_YOUTUBE_CATEGORY_ID", "24");
    let youtube_region_code = or_default("TRENDSCOPE_YOUTUBE_REGION_CODE", "US");

    let db_max_connections = parse_value::<u32>(
        "TRENDSCOPE_DB_MAX_CONNECTIONS",
        &or_default("TRENDSCOPE_DB_MAX_CONNECTIONS", "5"),
    )?;
    let db_acquire_timeout_secs = parse_num("TRENDSCOPE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let collector_max_results = parse_value::<u32>(
        "TRENDSCOPE_COLLECTOR_MAX_RESULTS",
        &or_default("TRENDSCOPE_COLLECTOR_MAX_RESULTS", "25"),
    )?;
    if !(1..=50).contains(&collector_max_results) {
        return Err(ConfigError::InvalidEnvVar {
            var: "TRENDSCOPE_COLLECTOR_MAX_RESULTS".to_string(),
            reason: format!("{collector_max_results} is outside 1..=50"),
        });
    }
    let collector_request_timeout_secs = parse_num("TRENDSCOPE_COLLECTOR_TIMEOUT_SECS", "10")?;
    if collector_request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "TRENDSCOPE_COLLECTOR_TIMEOUT_SECS".to_string(),
            reason: "must be at least 1 second".to_string(),
        });
    }
    let collector_user_agent = or_default(
        "TRENDSCOPE_COLLECTOR_USER_AGENT",
        "trendscope/0.1 (trend-collector)",
    );
    let collector_retry_backoff_ms = parse_num("TRENDSCOPE_COLLECTOR_RETRY_BACKOFF_MS", "1000")?;

    let assistant_enabled = parse_bool(
        "TRENDSCOPE_ASSISTANT_ENABLED",
        &or_default("TRENDSCOPE_ASSISTANT_ENABLED", "true"),
    )?;
    let assistant_model = or_default("TRENDSCOPE_ASSISTANT_MODEL", "claude-3-sonnet");
    let assistant_context_size = parse_value::<u32>(
        "TRENDSCOPE_ASSISTANT_CONTEXT_SIZE",
        &or_default("TRENDSCOPE_ASSISTANT_CONTEXT_SIZE", "100000"),
    )?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        secret_key,
        cors_origin,
        youtube_api_key,
        instagram_access_token,
        youtube_category_id,
        youtube_region_code,
        db_max_connections,
        db_acquire_timeout_secs,
        collector_max_results,
        collector_request_timeout_secs,
        collector_user_agent,
        collector_retry_backoff_ms,
        assistant_enabled,
        assistant_model,
        assistant_context_size,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TRENDSCOPE_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
