//! Platform collectors and the collection-run orchestration that persists
//! their output.

pub mod error;
mod http;
pub mod instagram;
pub mod mock;
mod retry;
pub mod run;
pub mod youtube;

use async_trait::async_trait;
use trendscope_core::{AppConfig, Platform, RecordSource, TrendRecord};

pub use error::CollectionError;
pub use instagram::InstagramCollector;
pub use mock::MockCollector;
pub use run::{collect_all, run_collection, RunOutcome, TriggerSource};
pub use youtube::YouTubeCollector;

/// A source of trend records for one platform.
///
/// Implementations are chosen once at construction (live or mock) and are
/// never swapped mid-run.
#[async_trait]
pub trait TrendCollector: Send + Sync {
    fn platform(&self) -> Platform;

    /// Whether this collector talks to the real platform or serves demo data.
    fn source(&self) -> RecordSource;

    /// Fetch the current batch of trending content.
    async fn collect(&self) -> Result<Vec<TrendRecord>, CollectionError>;
}

/// Collector-facing slice of [`AppConfig`].
#[derive(Clone)]
pub struct CollectorSettings {
    pub youtube_api_key: Option<String>,
    pub instagram_access_token: Option<String>,
    pub youtube_category_id: String,
    pub youtube_region_code: String,
    pub max_results: u32,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub retry_backoff_ms: u64,
}

impl CollectorSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            youtube_api_key: config.youtube_api_key.clone(),
            instagram_access_token: config.instagram_access_token.clone(),
            youtube_category_id: config.youtube_category_id.clone(),
            youtube_region_code: config.youtube_region_code.clone(),
            max_results: config.collector_max_results,
            request_timeout_secs: config.collector_request_timeout_secs,
            user_agent: config.collector_user_agent.clone(),
            retry_backoff_ms: config.collector_retry_backoff_ms,
        }
    }

    /// The non-blank credential for `platform`, if one is configured.
    #[must_use]
    pub fn credential(&self, platform: Platform) -> Option<&str> {
        let raw = match platform {
            Platform::YouTube => self.youtube_api_key.as_deref(),
            Platform::Instagram => self.instagram_access_token.as_deref(),
        };
        raw.map(str::trim).filter(|v| !v.is_empty())
    }

    /// Which collector variant [`build_collector`] will pick for `platform`.
    #[must_use]
    pub fn source_for(&self, platform: Platform) -> RecordSource {
        if self.credential(platform).is_some() {
            RecordSource::Live
        } else {
            RecordSource::Mock
        }
    }
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            youtube_api_key: None,
            instagram_access_token: None,
            youtube_category_id: "24".to_string(),
            youtube_region_code: "US".to_string(),
            max_results: 25,
            request_timeout_secs: 10,
            user_agent: "trendscope/0.1 (trend-collector)".to_string(),
            retry_backoff_ms: 1_000,
        }
    }
}

impl std::fmt::Debug for CollectorSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorSettings")
            .field("youtube", &self.source_for(Platform::YouTube))
            .field("instagram", &self.source_for(Platform::Instagram))
            .field("youtube_category_id", &self.youtube_category_id)
            .field("youtube_region_code", &self.youtube_region_code)
            .field("max_results", &self.max_results)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish_non_exhaustive()
    }
}

/// Builds the collector for `platform`: live when a credential is configured,
/// mock otherwise.
///
/// # Errors
///
/// Returns [`CollectionError::Http`] if a live collector's HTTP client cannot
/// be built.
pub fn build_collector(
    platform: Platform,
    settings: &CollectorSettings,
) -> Result<Box<dyn TrendCollector>, CollectionError> {
    let collector: Box<dyn TrendCollector> = match (platform, settings.credential(platform)) {
        (Platform::YouTube, Some(key)) => Box::new(YouTubeCollector::new(key, settings)?),
        (Platform::Instagram, Some(token)) => {
            Box::new(InstagramCollector::new(token, settings)?)
        }
        (_, None) => Box::new(MockCollector::new(platform, settings.max_results)),
    };
    tracing::debug!(
        %platform,
        source = %collector.source(),
        "collector selected"
    );
    Ok(collector)
}

/// Builds one collector per supported platform.
///
/// # Errors
///
/// Returns the first [`CollectionError`] raised by [`build_collector`].
pub fn build_all_collectors(
    settings: &CollectorSettings,
) -> Result<Vec<Box<dyn TrendCollector>>, CollectionError> {
    Platform::ALL
        .iter()
        .map(|platform| build_collector(*platform, settings))
        .collect()
}
