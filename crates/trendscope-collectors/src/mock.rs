//! Deterministic demo data used when a platform has no credential configured.

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use trendscope_core::{extract_hashtags, Platform, RecordSource, TrendRecord};

use crate::error::CollectionError;
use crate::TrendCollector;

const YOUTUBE_TITLES: [&str; 5] = [
    "Top 10 Trending Dance Moves 2024 #viral #dance #trending",
    "Celebrity Interview Goes Viral #celebrity #interview",
    "Movie Trailer Reaction #movie #reaction #trailer",
    "Music Video Behind Scenes #music #behindthescenes",
    "Comedy Sketch Viral #comedy #funny #viral",
];

const INSTAGRAM_CAPTIONS: [&str; 5] = [
    "Fashion trending now! #fashion #style #ootd #trending",
    "Food that's taking over social media #food #viral #cooking",
    "Travel destinations everyone's talking about #travel #wanderlust",
    "Fitness motivation for your day #fitness #health #motivation",
    "Art that's capturing hearts #art #creative #inspiration",
];

/// Fixed reference instant the demo timestamps count back from.
fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Returns the same five-item dataset per platform on every call.
#[derive(Debug, Clone)]
pub struct MockCollector {
    platform: Platform,
    max_results: usize,
}

impl MockCollector {
    #[must_use]
    pub fn new(platform: Platform, max_results: u32) -> Self {
        Self {
            platform,
            max_results: max_results as usize,
        }
    }

    #[must_use]
    pub fn records(&self) -> Vec<TrendRecord> {
        match self.platform {
            Platform::YouTube => youtube_records(self.max_results),
            Platform::Instagram => instagram_records(self.max_results),
        }
    }
}

#[async_trait]
impl TrendCollector for MockCollector {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn source(&self) -> RecordSource {
        RecordSource::Mock
    }

    async fn collect(&self) -> Result<Vec<TrendRecord>, CollectionError> {
        Ok(self.records())
    }
}

fn youtube_records(max_results: usize) -> Vec<TrendRecord> {
    (0_i64..)
        .zip(YOUTUBE_TITLES)
        .take(max_results)
        .map(|(i, title)| TrendRecord {
            platform: Platform::YouTube,
            content_id: format!("youtube_demo_{i}"),
            title: title.to_string(),
            description: String::new(),
            author: format!("Creator_{i}"),
            url: None,
            views: 10_000 + i * 1_000,
            likes: 500 + i * 50,
            comments: 100 + i * 10,
            hashtags: extract_hashtags(title),
            observed_at: anchor() - Duration::hours(2 * i),
            source: RecordSource::Mock,
        })
        .collect()
}

fn instagram_records(max_results: usize) -> Vec<TrendRecord> {
    (0_i64..)
        .zip(INSTAGRAM_CAPTIONS)
        .take(max_results)
        .map(|(i, caption)| TrendRecord {
            platform: Platform::Instagram,
            content_id: format!("instagram_demo_{i}"),
            title: caption.to_string(),
            description: caption.to_string(),
            author: format!("Influencer_{i}"),
            url: None,
            views: 0,
            likes: 5_000 + i * 500,
            comments: 200 + i * 20,
            hashtags: extract_hashtags(caption),
            observed_at: anchor() - Duration::hours(3 * i),
            source: RecordSource::Mock,
        })
        .collect()
}
