//! Live collector for the Instagram Graph API media edge of the token's account.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use trendscope_core::{extract_hashtags, Platform, RecordSource, TrendRecord};

use crate::error::CollectionError;
use crate::http::{build_client, fetch_json};
use crate::retry::retry_once_on_rate_limit;
use crate::{CollectorSettings, TrendCollector};

pub const DEFAULT_BASE_URL: &str = "https://graph.instagram.com";

const MEDIA_FIELDS: &str =
    "id,caption,media_type,permalink,timestamp,username,like_count,comments_count";

#[derive(Debug, Deserialize)]
struct MediaListResponse {
    #[serde(default)]
    data: Vec<MediaItem>,
}

#[derive(Debug, Deserialize)]
struct MediaItem {
    id: String,
    #[serde(default)]
    caption: Option<String>,
    #[serde(default)]
    permalink: Option<String>,
    #[serde(deserialize_with = "graph_timestamp")]
    timestamp: DateTime<Utc>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    like_count: Option<i64>,
    #[serde(default)]
    comments_count: Option<i64>,
}

/// Graph API timestamps use a colon-less offset (`2024-01-15T12:00:00+0000`),
/// which RFC 3339 parsing rejects.
fn graph_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    DateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(&raw))
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(serde::de::Error::custom)
}

impl MediaItem {
    fn into_record(self) -> TrendRecord {
        let caption = self.caption.unwrap_or_default();
        let title = caption.lines().next().unwrap_or_default().trim().to_string();
        TrendRecord {
            platform: Platform::Instagram,
            content_id: format!("instagram_{}", self.id),
            title,
            hashtags: extract_hashtags(&caption),
            description: caption,
            author: self.username.unwrap_or_default(),
            url: self.permalink,
            views: 0,
            likes: self.like_count.unwrap_or(0),
            comments: self.comments_count.unwrap_or(0),
            observed_at: self.timestamp,
            source: RecordSource::Live,
        }
        .normalized()
    }
}

pub struct InstagramCollector {
    client: Client,
    base_url: String,
    access_token: String,
    max_results: u32,
    retry_backoff_ms: u64,
}

impl InstagramCollector {
    /// Creates a collector pointed at the production Graph API.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::Http`] if the HTTP client cannot be built.
    pub fn new(access_token: &str, settings: &CollectorSettings) -> Result<Self, CollectionError> {
        Self::with_base_url(access_token, settings, DEFAULT_BASE_URL)
    }

    /// Creates a collector with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(
        access_token: &str,
        settings: &CollectorSettings,
        base_url: &str,
    ) -> Result<Self, CollectionError> {
        Ok(Self {
            client: build_client(settings.request_timeout_secs, &settings.user_agent)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
            max_results: settings.max_results.max(1),
            retry_backoff_ms: settings.retry_backoff_ms,
        })
    }

    async fn fetch_once(&self) -> Result<Vec<TrendRecord>, CollectionError> {
        let url = format!("{}/me/media", self.base_url);
        let limit = self.max_results.to_string();
        let request = self.client.get(&url).query(&[
            ("fields", MEDIA_FIELDS),
            ("limit", limit.as_str()),
            ("access_token", self.access_token.as_str()),
        ]);

        let body: MediaListResponse =
            fetch_json(Platform::Instagram, "instagram me/media", request).await?;
        Ok(body
            .data
            .into_iter()
            .map(MediaItem::into_record)
            .collect())
    }
}

#[async_trait]
impl TrendCollector for InstagramCollector {
    fn platform(&self) -> Platform {
        Platform::Instagram
    }

    fn source(&self) -> RecordSource {
        RecordSource::Live
    }

    async fn collect(&self) -> Result<Vec<TrendRecord>, CollectionError> {
        let records =
            retry_once_on_rate_limit(self.retry_backoff_ms, || self.fetch_once()).await?;
        tracing::info!(platform = "instagram", count = records.len(), "fetched media");
        Ok(records)
    }
}
