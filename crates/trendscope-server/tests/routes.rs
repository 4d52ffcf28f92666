//! Route tests against an in-memory database with mock collectors.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use sqlx::SqlitePool;
use tower::ServiceExt;
use trendscope_core::{AppConfig, Environment};
use trendscope_db::connect_in_memory;
use trendscope_server::{build_app, AppState, ENDPOINTS};

const SECRET: &str = "test-secret";
const ORIGIN: &str = "http://localhost:8501";

fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        log_level: "warn".to_string(),
        secret_key: SECRET.to_string(),
        cors_origin: ORIGIN.to_string(),
        youtube_api_key: None,
        instagram_access_token: None,
        youtube_category_id: "24".to_string(),
        youtube_region_code: "US".to_string(),
        db_max_connections: 1,
        db_acquire_timeout_secs: 5,
        collector_max_results: 25,
        collector_request_timeout_secs: 5,
        collector_user_agent: "trendscope-test".to_string(),
        collector_retry_backoff_ms: 10,
        assistant_enabled: true,
        assistant_model: "claude-3-sonnet".to_string(),
        assistant_context_size: 100_000,
    }
}

fn app(pool: &SqlitePool) -> Router {
    build_app(AppState::new(pool.clone(), Arc::new(test_config())))
}

async fn get(pool: &SqlitePool, uri: &str) -> (StatusCode, serde_json::Value) {
    send(
        pool,
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request"),
    )
    .await
}

async fn send(pool: &SqlitePool, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app(pool).oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn collect_request(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/collect");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

async fn collected_pool() -> SqlitePool {
    let pool = connect_in_memory().await.expect("pool");
    let (status, _) = send(&pool, collect_request(Some(SECRET))).await;
    assert_eq!(status, StatusCode::OK);
    pool
}

// ---------------------------------------------------------------------------
// Health and index
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_reachable_storage() {
    let pool = connect_in_memory().await.unwrap();
    let (status, json) = get(&pool, "/api/v1/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["storage_reachable"], true);
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn health_reports_unreachable_storage_as_503() {
    let pool = connect_in_memory().await.unwrap();
    pool.close().await;
    let (status, json) = get(&pool, "/api/v1/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["data"]["storage_reachable"], false);
}

#[tokio::test]
async fn index_lists_every_endpoint() {
    let pool = connect_in_memory().await.unwrap();
    let (status, json) = get(&pool, "/").await;

    assert_eq!(status, StatusCode::OK);
    let listed = json["data"].as_array().expect("data array");
    assert_eq!(listed.len(), ENDPOINTS.len());
    assert!(listed
        .iter()
        .any(|e| e["method"] == "POST" && e["path"] == "/api/v1/collect"));
}

#[tokio::test]
async fn every_listed_get_endpoint_is_routed() {
    let pool = connect_in_memory().await.unwrap();
    for endpoint in ENDPOINTS.iter().filter(|e| e.method == "GET") {
        let uri = endpoint.path.replace("{platform}", "youtube");
        let (status, _) = get(&pool, &uri).await;
        assert_eq!(status, StatusCode::OK, "GET {uri}");
    }
}

#[tokio::test]
async fn unknown_route_is_404() {
    let pool = connect_in_memory().await.unwrap();
    let (status, _) = get(&pool, "/api/v1/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Middleware
// ---------------------------------------------------------------------------

#[tokio::test]
async fn request_id_is_echoed() {
    let pool = connect_in_memory().await.unwrap();
    let response = app(&pool)
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header("x-request-id", "req-abc")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-abc")
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["meta"]["request_id"], "req-abc");
}

#[tokio::test]
async fn cors_allows_configured_origin() {
    let pool = connect_in_memory().await.unwrap();
    let response = app(&pool)
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header(header::ORIGIN, ORIGIN)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some(ORIGIN)
    );
}

// ---------------------------------------------------------------------------
// Collect trigger
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collect_requires_bearer_token() {
    let pool = connect_in_memory().await.unwrap();

    let (status, json) = send(&pool, collect_request(None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["code"], "unauthorized");

    let (status, _) = send(&pool, collect_request(Some("wrong-secret"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, runs) = get(&pool, "/api/v1/collection-runs").await;
    assert_eq!(runs["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn collect_runs_every_mock_collector() {
    let pool = connect_in_memory().await.unwrap();
    let (status, json) = send(&pool, collect_request(Some(SECRET))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["succeeded"], 2);
    assert_eq!(json["data"]["failed"], 0);
    let runs = json["data"]["runs"].as_array().expect("runs");
    assert_eq!(runs[0]["platform"], "youtube");
    assert_eq!(runs[0]["source"], "mock");
    assert_eq!(runs[0]["records_written"], 5);
    assert_eq!(runs[1]["platform"], "instagram");

    let (_, listed) = get(&pool, "/api/v1/collection-runs").await;
    let listed = listed["data"].as_array().expect("runs");
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|r| r["trigger_source"] == "api"));
    assert!(listed.iter().all(|r| r["status"] == "succeeded"));
}

#[tokio::test]
async fn repeated_collect_writes_nothing_new() {
    let pool = collected_pool().await;
    let (status, json) = send(&pool, collect_request(Some(SECRET))).await;

    assert_eq!(status, StatusCode::OK);
    let runs = json["data"]["runs"].as_array().expect("runs");
    assert!(runs.iter().all(|r| r["records_written"] == 0));

    let (_, records) = get(&pool, "/api/v1/records").await;
    assert_eq!(records["data"].as_array().map(Vec::len), Some(10));
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[tokio::test]
async fn records_filter_by_platform_and_limit() {
    let pool = collected_pool().await;

    let (status, json) = get(&pool, "/api/v1/records?platform=instagram&limit=3").await;
    assert_eq!(status, StatusCode::OK);
    let data = json["data"].as_array().expect("data");
    assert_eq!(data.len(), 3);
    assert!(data.iter().all(|r| r["platform"] == "instagram"));
}

#[tokio::test]
async fn records_filter_by_inclusive_date_range() {
    let pool = collected_pool().await;

    // Mock data is anchored at 2024-01-15T12:00Z and counts back in hours.
    let (status, json) = get(&pool, "/api/v1/records?since=2024-01-15&until=2024-01-15").await;
    assert_eq!(status, StatusCode::OK);
    let data = json["data"].as_array().expect("data");
    assert!(!data.is_empty());
    assert!(data
        .iter()
        .all(|r| r["observed_at"].as_str().unwrap_or("").starts_with("2024-01-15")));

    let (_, none) = get(&pool, "/api/v1/records?since=2024-02-01").await;
    assert_eq!(none["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn invalid_record_queries_are_rejected() {
    let pool = connect_in_memory().await.unwrap();
    for uri in [
        "/api/v1/records?platform=tiktok",
        "/api/v1/records?limit=0",
        "/api/v1/records?limit=501",
        "/api/v1/records?since=yesterday",
        "/api/v1/records?since=2024-02-01&until=2024-01-01",
    ] {
        let (status, json) = get(&pool, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json["error"]["code"], "validation_error", "{uri}");
    }
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn summary_counts_match_collected_records() {
    let pool = collected_pool().await;
    let (status, json) = get(&pool, "/api/v1/analytics/summary?top_n=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total_records"], 10);
    assert_eq!(json["data"]["platform_counts"]["youtube"], 5);
    assert_eq!(json["data"]["platform_counts"]["instagram"], 5);
    assert_eq!(json["data"]["top_content"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn summary_of_empty_store_is_zeroed() {
    let pool = connect_in_memory().await.unwrap();
    let (status, json) = get(&pool, "/api/v1/analytics/summary").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total_records"], 0);
    assert_eq!(json["data"]["platform_counts"]["youtube"], 0);
    assert!(json["data"]["as_of"].is_null());
}

#[tokio::test]
async fn summary_is_deterministic() {
    let pool = collected_pool().await;
    let (_, first) = get(&pool, "/api/v1/analytics/summary").await;
    let (_, second) = get(&pool, "/api/v1/analytics/summary").await;
    assert_eq!(first["data"], second["data"]);
}

#[tokio::test]
async fn trending_ranks_shared_hashtags() {
    let pool = collected_pool().await;
    let (status, json) = get(&pool, "/api/v1/analytics/trending").await;

    assert_eq!(status, StatusCode::OK);
    let topics = json["data"].as_array().expect("topics");
    assert!(topics.iter().any(|t| t["hashtag"] == "viral"));
    assert!(topics
        .iter()
        .all(|t| t["record_count"].as_u64().unwrap_or(0) >= 2));
}

#[tokio::test]
async fn sentiment_caps_items_by_top_n() {
    let pool = collected_pool().await;
    let (status, json) = get(&pool, "/api/v1/analytics/sentiment?top_n=4").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["items"].as_array().map(Vec::len), Some(4));
    let dist = &json["data"]["distribution"];
    let total = dist["positive"].as_u64().unwrap()
        + dist["neutral"].as_u64().unwrap()
        + dist["negative"].as_u64().unwrap();
    assert_eq!(total, 10);
}

#[tokio::test]
async fn engagement_ranks_rated_records_by_rate() {
    let pool = collected_pool().await;
    let (status, json) = get(&pool, "/api/v1/analytics/engagement?top_n=3").await;

    assert_eq!(status, StatusCode::OK);
    let items = json["data"]["items"].as_array().expect("items");
    assert_eq!(items.len(), 3);
    // Instagram reports no views, so only YouTube records carry a rate.
    assert!(items.iter().all(|i| i["platform"] == "youtube"));
    let rates: Vec<f64> = items
        .iter()
        .map(|i| i["engagement_rate"].as_f64().expect("rate"))
        .collect();
    assert!(rates.windows(2).all(|w| w[0] >= w[1]), "{rates:?}");

    let stats = &json["data"]["stats"];
    assert_eq!(stats["rated_records"], 5);
    assert_eq!(stats["max_rate"].as_f64(), Some(rates[0]));
}

#[tokio::test]
async fn engagement_of_instagram_only_is_empty() {
    let pool = collected_pool().await;
    let (status, json) = get(&pool, "/api/v1/analytics/engagement?platform=instagram").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["items"].as_array().map(Vec::len), Some(0));
    assert!(json["data"]["stats"]["mean_rate"].is_null());
}

#[tokio::test]
async fn invalid_top_n_is_rejected() {
    let pool = connect_in_memory().await.unwrap();
    let (status, json) = get(&pool, "/api/v1/analytics/summary?top_n=101").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn invalid_collection_runs_limit_uses_error_envelope() {
    let pool = connect_in_memory().await.unwrap();
    for uri in [
        "/api/v1/collection-runs?limit=abc",
        "/api/v1/collection-runs?limit=0",
        "/api/v1/collection-runs?limit=201",
    ] {
        let (status, json) = get(&pool, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(json["error"]["code"], "validation_error", "{uri}");
        assert!(json["meta"]["request_id"].is_string(), "{uri}");
    }

    let (status, _) = get(&pool, "/api/v1/collection-runs?limit=200").await;
    assert_eq!(status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Platform preview and config
// ---------------------------------------------------------------------------

#[tokio::test]
async fn platform_preview_does_not_persist() {
    let pool = connect_in_memory().await.unwrap();
    let (status, json) = get(&pool, "/api/v1/platforms/instagram/trending").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["platform"], "instagram");
    assert_eq!(json["data"]["source"], "mock");
    assert_eq!(json["data"]["count"], 5);

    let (_, records) = get(&pool, "/api/v1/records").await;
    assert_eq!(records["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn unknown_platform_preview_is_bad_request() {
    let pool = connect_in_memory().await.unwrap();
    let (status, json) = get(&pool, "/api/v1/platforms/tiktok/trending").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "bad_request");
}

#[tokio::test]
async fn config_snapshot_omits_secrets() {
    let pool = connect_in_memory().await.unwrap();
    let (status, json) = get(&pool, "/api/v1/config").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["env"], "test");
    assert_eq!(json["data"]["youtube_source"], "mock");
    assert_eq!(json["data"]["assistant"]["model"], "claude-3-sonnet");
    assert!(!json.to_string().contains(SECRET));
}
