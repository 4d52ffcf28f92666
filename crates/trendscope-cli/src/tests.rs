use trendscope_core::Environment;

use super::*;

/// Configuration for in-process tests; never reads the environment.
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        env: Environment::Test,
        bind_addr: ([127, 0, 0, 1], 0).into(),
        log_level: "warn".to_string(),
        secret_key: "test".to_string(),
        cors_origin: "http://localhost:8501".to_string(),
        youtube_api_key: None,
        instagram_access_token: None,
        youtube_category_id: "24".to_string(),
        youtube_region_code: "US".to_string(),
        db_max_connections: 1,
        db_acquire_timeout_secs: 5,
        collector_max_results: 3,
        collector_request_timeout_secs: 5,
        collector_user_agent: "trendscope-test".to_string(),
        collector_retry_backoff_ms: 10,
        assistant_enabled: false,
        assistant_model: "claude-3-sonnet".to_string(),
        assistant_context_size: 100_000,
    }
}

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["trendscope", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["trendscope", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["trendscope"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn run_defaults() {
    let cli = Cli::try_parse_from(["trendscope", "run"]).unwrap();
    match cli.command {
        Some(Commands::Run {
            port,
            refresh_secs,
            log_file,
        }) => {
            assert_eq!(port, None);
            assert_eq!(refresh_secs, 30);
            assert_eq!(log_file, PathBuf::from("trendscope.log"));
        }
        other => panic!("expected run, got {other:?}"),
    }
}

#[test]
fn run_with_port_override() {
    let cli = Cli::try_parse_from(["trendscope", "run", "--port", "8080"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Run {
            port: Some(8080),
            ..
        })
    ));
}

#[test]
fn run_rejects_non_numeric_port() {
    assert!(Cli::try_parse_from(["trendscope", "run", "--port", "http"]).is_err());
}

#[test]
fn collect_without_platform_targets_all() {
    let cli = Cli::try_parse_from(["trendscope", "collect"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Collect { platform: None })
    ));
}

#[test]
fn collect_with_platform_filter() {
    let cli = Cli::try_parse_from(["trendscope", "collect", "--platform", "youtube"]).unwrap();
    match cli.command {
        Some(Commands::Collect { platform }) => assert_eq!(platform.as_deref(), Some("youtube")),
        other => panic!("expected collect, got {other:?}"),
    }
}

#[test]
fn records_flags_become_raw_query() {
    let cli = Cli::try_parse_from([
        "trendscope",
        "records",
        "--platform",
        "instagram",
        "--since",
        "2024-01-01",
        "--limit",
        "5",
    ])
    .unwrap();
    let Some(Commands::Records { scope, limit }) = cli.command else {
        panic!("expected records");
    };
    let raw = scope.into_raw(None, limit);
    assert_eq!(raw.platform.as_deref(), Some("instagram"));
    assert_eq!(raw.since.as_deref(), Some("2024-01-01"));
    assert_eq!(raw.until, None);
    assert_eq!(raw.limit.as_deref(), Some("5"));
    assert_eq!(raw.top_n, None);
}

#[test]
fn summary_top_n_is_passed_through_unparsed() {
    // Validated by the query layer, not clap.
    let cli = Cli::try_parse_from(["trendscope", "summary", "--top-n", "abc"]).unwrap();
    let Some(Commands::Summary { scope, top_n }) = cli.command else {
        panic!("expected summary");
    };
    let raw = scope.into_raw(top_n, None);
    assert_eq!(raw.top_n.as_deref(), Some("abc"));
    assert!(trendscope_core::AnalyticsQuery::parse(&raw).is_err());
}

#[test]
fn dashboard_defaults() {
    let cli = Cli::try_parse_from(["trendscope", "dashboard"]).unwrap();
    match cli.command {
        Some(Commands::Dashboard {
            api_url,
            refresh_secs,
            once,
            ..
        }) => {
            assert_eq!(api_url, "http://127.0.0.1:5000");
            assert_eq!(refresh_secs, 30);
            assert!(!once);
        }
        other => panic!("expected dashboard, got {other:?}"),
    }
}

#[test]
fn dashboard_once_with_custom_url() {
    let cli = Cli::try_parse_from([
        "trendscope",
        "dashboard",
        "--api-url",
        "http://10.0.0.2:9000",
        "--once",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Dashboard { once: true, ref api_url, .. }) if api_url == "http://10.0.0.2:9000"
    ));
}
