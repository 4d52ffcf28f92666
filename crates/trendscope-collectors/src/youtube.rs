//! Live collector for the YouTube Data API v3 `mostPopular` chart.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use trendscope_core::{extract_hashtags, Platform, RecordSource, TrendRecord};

use crate::error::CollectionError;
use crate::http::{build_client, fetch_json, truncate_chars};
use crate::retry::retry_once_on_rate_limit;
use crate::{CollectorSettings, TrendCollector};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// YouTube caps `maxResults` at 50 per page.
const MAX_PAGE_SIZE: u32 = 50;
const MAX_DESCRIPTION_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: VideoSnippet,
    #[serde(default)]
    statistics: VideoStatistics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    channel_title: String,
    published_at: DateTime<Utc>,
}

/// Counts arrive as decimal strings; any may be absent when the owner hides it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

fn count(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.parse::<i64>().ok()).unwrap_or(0).max(0)
}

impl VideoItem {
    fn into_record(self) -> TrendRecord {
        let hashtags = extract_hashtags(&format!(
            "{} {}",
            self.snippet.description, self.snippet.title
        ));
        TrendRecord {
            platform: Platform::YouTube,
            content_id: format!("youtube_{}", self.id),
            title: self.snippet.title,
            description: truncate_chars(&self.snippet.description, MAX_DESCRIPTION_CHARS),
            author: self.snippet.channel_title,
            url: Some(format!("https://www.youtube.com/watch?v={}", self.id)),
            views: count(self.statistics.view_count.as_deref()),
            likes: count(self.statistics.like_count.as_deref()),
            comments: count(self.statistics.comment_count.as_deref()),
            hashtags,
            observed_at: self.snippet.published_at,
            source: RecordSource::Live,
        }
        .normalized()
    }
}

pub struct YouTubeCollector {
    client: Client,
    base_url: String,
    api_key: String,
    category_id: String,
    region_code: String,
    max_results: u32,
    retry_backoff_ms: u64,
}

impl YouTubeCollector {
    /// Creates a collector pointed at the production YouTube API.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, settings: &CollectorSettings) -> Result<Self, CollectionError> {
        Self::with_base_url(api_key, settings, DEFAULT_BASE_URL)
    }

    /// Creates a collector with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::Http`] if the HTTP client cannot be built.
    pub fn with_base_url(
        api_key: &str,
        settings: &CollectorSettings,
        base_url: &str,
    ) -> Result<Self, CollectionError> {
        Ok(Self {
            client: build_client(settings.request_timeout_secs, &settings.user_agent)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            category_id: settings.youtube_category_id.clone(),
            region_code: settings.youtube_region_code.clone(),
            max_results: settings.max_results.clamp(1, MAX_PAGE_SIZE),
            retry_backoff_ms: settings.retry_backoff_ms,
        })
    }

    async fn fetch_once(&self) -> Result<Vec<TrendRecord>, CollectionError> {
        let url = format!("{}/videos", self.base_url);
        let max_results = self.max_results.to_string();
        let request = self.client.get(&url).query(&[
            ("part", "snippet,statistics"),
            ("chart", "mostPopular"),
            ("videoCategoryId", self.category_id.as_str()),
            ("regionCode", self.region_code.as_str()),
            ("maxResults", max_results.as_str()),
            ("key", self.api_key.as_str()),
        ]);

        let body: VideoListResponse =
            fetch_json(Platform::YouTube, "youtube videos.list", request).await?;
        Ok(body
            .items
            .into_iter()
            .map(VideoItem::into_record)
            .collect())
    }
}

#[async_trait]
impl TrendCollector for YouTubeCollector {
    fn platform(&self) -> Platform {
        Platform::YouTube
    }

    fn source(&self) -> RecordSource {
        RecordSource::Live
    }

    async fn collect(&self) -> Result<Vec<TrendRecord>, CollectionError> {
        let records =
            retry_once_on_rate_limit(self.retry_backoff_ms, || self.fetch_once()).await?;
        tracing::info!(platform = "youtube", count = records.len(), "fetched trending videos");
        Ok(records)
    }
}
