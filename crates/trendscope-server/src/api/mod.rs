mod analytics;
mod collect;
mod collection_runs;
mod config;
mod platforms;
mod records;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use trendscope_collectors::CollectorSettings;
use trendscope_core::{AppConfig, QueryError};

use crate::middleware::{request_id, require_bearer_auth, AuthState, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<AppConfig>,
    pub collectors: CollectorSettings,
}

impl AppState {
    #[must_use]
    pub fn new(pool: SqlitePool, config: Arc<AppConfig>) -> Self {
        let collectors = CollectorSettings::from_app_config(&config);
        Self {
            pool,
            config,
            collectors,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// One row of the route table served at `/`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Endpoint {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

/// Every route [`build_app`] registers.
pub const ENDPOINTS: &[Endpoint] = &[
    Endpoint {
        method: "GET",
        path: "/",
        description: "This endpoint index",
    },
    Endpoint {
        method: "GET",
        path: "/api/v1/health",
        description: "Service and storage health",
    },
    Endpoint {
        method: "GET",
        path: "/api/v1/records",
        description: "Stored records, newest first (platform, since, until, limit)",
    },
    Endpoint {
        method: "GET",
        path: "/api/v1/analytics/summary",
        description: "Counts, top content, sentiment, hashtags, keywords (platform, since, until, top_n)",
    },
    Endpoint {
        method: "GET",
        path: "/api/v1/analytics/trending",
        description: "Hashtag topics ranked by trend score (platform, since, until, top_n)",
    },
    Endpoint {
        method: "GET",
        path: "/api/v1/analytics/sentiment",
        description: "Per-record sentiment and distribution (platform, since, until, top_n)",
    },
    Endpoint {
        method: "GET",
        path: "/api/v1/analytics/engagement",
        description: "Records ranked by engagement rate, with rate statistics (platform, since, until, top_n)",
    },
    Endpoint {
        method: "GET",
        path: "/api/v1/platforms/{platform}/trending",
        description: "Fetch a platform's current trending content without storing it",
    },
    Endpoint {
        method: "POST",
        path: "/api/v1/collect",
        description: "Run every collector and store the results (bearer secret key)",
    },
    Endpoint {
        method: "GET",
        path: "/api/v1/collection-runs",
        description: "Recent collection runs (limit)",
    },
    Endpoint {
        method: "GET",
        path: "/api/v1/config",
        description: "Non-secret configuration snapshot",
    },
];

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    storage_reachable: bool,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: String, error: &trendscope_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

pub(super) fn map_query_error(request_id: String, error: &QueryError) -> ApiError {
    ApiError::new(request_id, "validation_error", error.to_string())
}

fn build_cors(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ]);
    match HeaderValue::from_str(origin) {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            tracing::warn!(origin, "invalid CORS origin; cross-origin requests disabled");
            cors
        }
    }
}

fn protected_router(auth: AuthState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/collect", post(collect::trigger_collection))
        .layer(axum::middleware::from_fn_with_state(
            auth,
            require_bearer_auth,
        ))
}

/// Builds the HTTP router. Routes are registered here and listed in
/// [`ENDPOINTS`]; nothing is discovered implicitly.
pub fn build_app(state: AppState) -> Router {
    let auth = AuthState::new(&state.config.secret_key);
    let cors = build_cors(&state.config.cors_origin);

    let public_routes = Router::new()
        .route("/", get(index))
        .route("/api/v1/health", get(health))
        .route("/api/v1/records", get(records::list_records))
        .route("/api/v1/analytics/summary", get(analytics::get_summary))
        .route("/api/v1/analytics/trending", get(analytics::get_trending))
        .route("/api/v1/analytics/sentiment", get(analytics::get_sentiment))
        .route("/api/v1/analytics/engagement", get(analytics::get_engagement))
        .route(
            "/api/v1/platforms/{platform}/trending",
            get(platforms::preview_trending),
        )
        .route(
            "/api/v1/collection-runs",
            get(collection_runs::list_collection_runs),
        )
        .route("/api/v1/config", get(config::get_config));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn index(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    ApiResponse::new(ENDPOINTS, req_id.0)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    match trendscope_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            ApiResponse::new(
                HealthData {
                    status: "ok",
                    storage_reachable: true,
                },
                req_id.0,
            ),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: storage unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiResponse::new(
                    HealthData {
                        status: "degraded",
                        storage_reachable: false,
                    },
                    req_id.0,
                ),
            )
        }
    }
}
