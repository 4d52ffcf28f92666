use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "TRENDSCOPE_ENV"));
}

#[test]
fn build_app_config_uses_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");

    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.database_url, "sqlite://data/trends.db");
    assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:5000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.secret_key, DEV_SECRET_KEY);
    assert_eq!(cfg.cors_origin, "http://localhost:8501");
    assert!(cfg.youtube_api_key.is_none());
    assert!(cfg.instagram_access_token.is_none());
    assert_eq!(cfg.youtube_category_id, "24");
    assert_eq!(cfg.youtube_region_code, "US");
    assert_eq!(cfg.db_max_connections, 5);
    assert_eq!(cfg.db_acquire_timeout_secs, 10);
    assert_eq!(cfg.collector_max_results, 25);
    assert_eq!(cfg.collector_request_timeout_secs, 10);
    assert_eq!(cfg.collector_user_agent, "trendscope/0.1 (trend-collector)");
    assert_eq!(cfg.collector_retry_backoff_ms, 1000);
    assert!(cfg.assistant_enabled);
    assert_eq!(cfg.assistant_model, "claude-3-sonnet");
    assert_eq!(cfg.assistant_context_size, 100_000);
}

#[test]
fn production_requires_secret_key() {
    let mut map = HashMap::new();
    map.insert("TRENDSCOPE_ENV", "production");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "TRENDSCOPE_SECRET_KEY"),
        "expected MissingEnvVar(TRENDSCOPE_SECRET_KEY), got: {result:?}"
    );
}

#[test]
fn production_accepts_explicit_secret_key() {
    let mut map = HashMap::new();
    map.insert("TRENDSCOPE_ENV", "production");
    map.insert("TRENDSCOPE_SECRET_KEY", "s3cret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.secret_key, "s3cret");
}

#[test]
fn blank_credentials_are_treated_as_absent() {
    let mut map = HashMap::new();
    map.insert("YOUTUBE_API_KEY", "   ");
    map.insert("INSTAGRAM_ACCESS_TOKEN", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.youtube_api_key.is_none());
    assert!(cfg.instagram_access_token.is_none());
}

#[test]
fn credentials_are_trimmed() {
    let mut map = HashMap::new();
    map.insert("YOUTUBE_API_KEY", " yt-key \n");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.youtube_api_key.as_deref(), Some("yt-key"));
}

#[test]
fn invalid_bind_addr_fails() {
    let mut map = HashMap::new();
    map.insert("TRENDSCOPE_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TRENDSCOPE_BIND_ADDR"),
        "expected InvalidEnvVar(TRENDSCOPE_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn collector_timeout_override() {
    let mut map = HashMap::new();
    map.insert("TRENDSCOPE_COLLECTOR_TIMEOUT_SECS", "3");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.collector_request_timeout_secs, 3);
}

#[test]
fn collector_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("TRENDSCOPE_COLLECTOR_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TRENDSCOPE_COLLECTOR_TIMEOUT_SECS"),
        "expected InvalidEnvVar(TRENDSCOPE_COLLECTOR_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn collector_max_results_out_of_range() {
    let mut map = HashMap::new();
    map.insert("TRENDSCOPE_COLLECTOR_MAX_RESULTS", "51");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TRENDSCOPE_COLLECTOR_MAX_RESULTS"),
        "expected InvalidEnvVar(TRENDSCOPE_COLLECTOR_MAX_RESULTS), got: {result:?}"
    );
}

#[test]
fn collector_timeout_of_zero_is_rejected() {
    let mut map = HashMap::new();
    map.insert("TRENDSCOPE_COLLECTOR_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TRENDSCOPE_COLLECTOR_TIMEOUT_SECS"),
        "expected InvalidEnvVar(TRENDSCOPE_COLLECTOR_TIMEOUT_SECS), got: {result:?}"
    );

    map.insert("TRENDSCOPE_COLLECTOR_TIMEOUT_SECS", "1");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.collector_request_timeout_secs, 1);
}

#[test]
fn assistant_enabled_accepts_false() {
    let mut map = HashMap::new();
    map.insert("TRENDSCOPE_ASSISTANT_ENABLED", "False");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(!cfg.assistant_enabled);
}

#[test]
fn assistant_enabled_rejects_garbage() {
    let mut map = HashMap::new();
    map.insert("TRENDSCOPE_ASSISTANT_ENABLED", "maybe");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "TRENDSCOPE_ASSISTANT_ENABLED"),
        "expected InvalidEnvVar(TRENDSCOPE_ASSISTANT_ENABLED), got: {result:?}"
    );
}

#[test]
fn with_port_replaces_only_the_port() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap().with_port(8080);
    assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:8080");
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = HashMap::new();
    map.insert("TRENDSCOPE_SECRET_KEY", "top-secret-value");
    map.insert("YOUTUBE_API_KEY", "yt-secret-value");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("top-secret-value"));
    assert!(!rendered.contains("yt-secret-value"));
    assert!(rendered.contains("[redacted]"));
}
