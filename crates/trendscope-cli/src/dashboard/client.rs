//! HTTP client the dashboard uses to read the API.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const TOP_N: usize = 5;

/// What the dashboard can show. Each variant is a distinct situation the
/// user must be able to tell apart.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    /// No HTTP response at all: connection refused, DNS failure, or timeout.
    BackendUnreachable { api_url: String, reason: String },
    /// The API answered with a non-success status or an unreadable body.
    BackendError {
        status: u16,
        code: String,
        message: String,
    },
    /// The API is healthy but has no stored records.
    NoData,
    Ready(Box<DashboardData>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub summary: SummaryView,
    pub topics: Vec<TopicView>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SummaryView {
    pub as_of: Option<DateTime<Utc>>,
    pub total_records: usize,
    pub platform_counts: BTreeMap<String, usize>,
    pub top_content: Vec<ContentView>,
    pub sentiment: SentimentView,
    pub top_hashtags: Vec<HashtagView>,
    pub engagement: EngagementView,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentView {
    pub platform: String,
    pub title: String,
    pub author: String,
    pub total_engagement: i64,
    pub trending_score: f64,
    pub sentiment: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SentimentView {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub mean_score: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HashtagView {
    pub hashtag: String,
    pub count: usize,
    pub trend_score: f64,
}

/// `mean_rate` is `None` when no record reports views.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngagementView {
    pub rated_records: usize,
    pub mean_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopicView {
    pub hashtag: String,
    pub record_count: usize,
    pub platforms: Vec<String>,
    pub score: f64,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct HealthView {
    storage_reachable: bool,
}

#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: String,
}

impl DashboardClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Reads health, summary, and trending topics and classifies the result.
    pub async fn fetch(&self) -> DashboardState {
        match self.try_fetch().await {
            Ok(state) | Err(state) => state,
        }
    }

    async fn try_fetch(&self) -> Result<DashboardState, DashboardState> {
        let health: HealthView = self.get("/api/v1/health").await?;
        if !health.storage_reachable {
            return Ok(DashboardState::BackendError {
                status: StatusCode::SERVICE_UNAVAILABLE.as_u16(),
                code: "storage_unreachable".to_string(),
                message: "the API is up but cannot reach its database".to_string(),
            });
        }

        let summary: SummaryView = self
            .get(&format!("/api/v1/analytics/summary?top_n={TOP_N}"))
            .await?;
        if summary.total_records == 0 {
            return Ok(DashboardState::NoData);
        }

        let topics: Vec<TopicView> = self
            .get(&format!("/api/v1/analytics/trending?top_n={TOP_N}"))
            .await?;

        Ok(DashboardState::Ready(Box::new(DashboardData { summary, topics })))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, DashboardState> {
        let url = format!("{}{path}", self.base_url);
        let response = self.http.get(&url).send().await.map_err(|e| {
            tracing::debug!(url, error = %e, "dashboard request failed");
            DashboardState::BackendUnreachable {
                api_url: self.base_url.clone(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| DashboardState::BackendUnreachable {
            api_url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        // A degraded health check still carries a readable body.
        if status.is_success() || status == StatusCode::SERVICE_UNAVAILABLE {
            if let Ok(envelope) = serde_json::from_str::<Envelope<T>>(&body) {
                return Ok(envelope.data);
            }
        }

        Err(classify_error(status, &body))
    }
}

fn classify_error(status: StatusCode, body: &str) -> DashboardState {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => DashboardState::BackendError {
            status: status.as_u16(),
            code: envelope.error.code,
            message: envelope.error.message,
        },
        Err(_) if status.is_success() => DashboardState::BackendError {
            status: status.as_u16(),
            code: "invalid_response".to_string(),
            message: "the API returned a body the dashboard could not read".to_string(),
        },
        Err(_) => DashboardState::BackendError {
            status: status.as_u16(),
            code: "http_error".to_string(),
            message: status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string(),
        },
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
