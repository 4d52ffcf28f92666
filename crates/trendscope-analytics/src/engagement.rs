//! Per-record engagement and trending scores.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;
use trendscope_core::{Platform, TrendRecord};

use crate::scorer::lexicon_score;
use crate::summary::{engagement_stats, round2, EngagementStats};

/// Engagement rate at which the engagement factor saturates, in percent.
const RATE_SATURATION_PCT: f64 = 10.0;
const RECENCY_WINDOW_HOURS: f64 = 24.0;
const HASHTAG_SATURATION: f64 = 5.0;

/// `(likes + comments) / views * 100`, or `None` when the platform reports no views.
#[must_use]
pub fn engagement_rate(record: &TrendRecord) -> Option<f64> {
    if record.views <= 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let rate = record.total_engagement() as f64 / record.views as f64 * 100.0;
    Some(rate)
}

/// Sentiment of a record's title and description.
#[must_use]
pub fn record_sentiment(record: &TrendRecord) -> f32 {
    lexicon_score(&format!("{} {}", record.title, record.description))
}

/// Hours elapsed from `observed_at` to `as_of`, floored at zero.
pub(crate) fn hours_since(observed_at: DateTime<Utc>, as_of: DateTime<Utc>) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let hours = (as_of - observed_at).num_seconds() as f64 / 3_600.0;
    hours.max(0.0)
}

/// Weighted trending score in `[0, 1]`, rounded to three decimals:
///
/// | Factor     | Weight | Normalization                      |
/// |------------|--------|------------------------------------|
/// | engagement | 0.4    | `min(rate / 10, 1)`                |
/// | recency    | 0.3    | `1 - hours / 24`, zero past a day  |
/// | hashtags   | 0.2    | `min(count / 5, 1)`                |
/// | sentiment  | 0.1    | positive part of the lexicon score |
#[must_use]
pub fn trending_score(record: &TrendRecord, as_of: DateTime<Utc>) -> f64 {
    let engagement = engagement_rate(record)
        .map_or(0.0, |rate| (rate / RATE_SATURATION_PCT).min(1.0));

    let hours_old = hours_since(record.observed_at, as_of);
    let recency = if hours_old < RECENCY_WINDOW_HOURS {
        1.0 - hours_old / RECENCY_WINDOW_HOURS
    } else {
        0.0
    };

    #[allow(clippy::cast_precision_loss)]
    let hashtags = (record.hashtags.len() as f64 / HASHTAG_SATURATION).min(1.0);

    let sentiment = f64::from(record_sentiment(record).max(0.0));

    let score = engagement * 0.4 + recency * 0.3 + hashtags * 0.2 + sentiment * 0.1;
    round3(score.min(1.0))
}

pub(crate) fn round3(value: f64) -> f64 {
    (value * 1_000.0).round() / 1_000.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordEngagement {
    pub platform: Platform,
    pub content_id: String,
    pub title: String,
    pub author: String,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    /// Percent, rounded to two decimals.
    pub engagement_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementReport {
    pub items: Vec<RecordEngagement>,
    /// Covers every record with views, not only the listed items.
    pub stats: EngagementStats,
}

/// Ranks records by engagement rate, highest first, capped at `top_n`.
///
/// Records without views have no rate and are left out. Equal rates fall
/// back to total engagement, then `(platform, content_id)`.
#[must_use]
pub fn engagement_report(records: &[TrendRecord], top_n: usize) -> EngagementReport {
    let mut rated: Vec<(&TrendRecord, f64)> = records
        .iter()
        .filter_map(|r| engagement_rate(r).map(|rate| (r, rate)))
        .collect();
    rated.sort_by(|(a, rate_a), (b, rate_b)| {
        rate_b
            .partial_cmp(rate_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.total_engagement().cmp(&a.total_engagement()))
            .then_with(|| a.platform.cmp(&b.platform))
            .then_with(|| a.content_id.cmp(&b.content_id))
    });

    let items = rated
        .into_iter()
        .take(top_n)
        .map(|(record, rate)| RecordEngagement {
            platform: record.platform,
            content_id: record.content_id.clone(),
            title: record.title.clone(),
            author: record.author.clone(),
            views: record.views,
            likes: record.likes,
            comments: record.comments,
            engagement_rate: round2(rate),
        })
        .collect();

    EngagementReport {
        items,
        stats: engagement_stats(records),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use trendscope_core::{Platform, RecordSource};

    use super::*;

    fn record(views: i64, likes: i64, comments: i64) -> TrendRecord {
        ranked("youtube_x", views, likes, comments)
    }

    fn ranked(id: &str, views: i64, likes: i64, comments: i64) -> TrendRecord {
        TrendRecord {
            platform: Platform::YouTube,
            content_id: id.to_string(),
            title: "Plain title".to_string(),
            description: String::new(),
            author: "a".to_string(),
            url: None,
            views,
            likes,
            comments,
            hashtags: vec![],
            observed_at: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
            source: RecordSource::Mock,
        }
    }

    #[test]
    fn engagement_rate_is_percent_of_views() {
        let rate = engagement_rate(&record(10_000, 500, 100)).unwrap();
        assert!((rate - 6.0).abs() < 1e-9);
    }

    #[test]
    fn engagement_rate_is_none_without_views() {
        assert_eq!(engagement_rate(&record(0, 500, 100)), None);
    }

    #[test]
    fn trending_score_of_fresh_engaging_record() {
        let mut r = record(1_000, 150, 0);
        r.hashtags = (0..5).map(|i| format!("t{i}")).collect();
        r.title = "amazing".to_string();
        // engagement 1.0*0.4 + recency 1.0*0.3 + hashtags 1.0*0.2 + sentiment 0.5*0.1
        assert_eq!(trending_score(&r, r.observed_at), 0.95);
    }

    #[test]
    fn trending_score_recency_decays_over_a_day() {
        let r = record(0, 0, 0);
        assert_eq!(trending_score(&r, r.observed_at + Duration::hours(12)), 0.15);
        assert_eq!(trending_score(&r, r.observed_at + Duration::hours(30)), 0.0);
    }

    #[test]
    fn trending_score_ignores_negative_sentiment() {
        let mut r = record(0, 0, 0);
        r.title = "terrible flop".to_string();
        assert_eq!(trending_score(&r, r.observed_at + Duration::days(2)), 0.0);
    }

    #[test]
    fn engagement_report_ranks_by_rate_not_volume() {
        let records = vec![
            ranked("youtube_big", 1_000_000, 20_000, 0),
            ranked("youtube_small", 1_000, 80, 20),
            ranked("youtube_none", 0, 900, 900),
        ];
        let report = engagement_report(&records, 10);

        let ids: Vec<&str> = report.items.iter().map(|i| i.content_id.as_str()).collect();
        assert_eq!(ids, vec!["youtube_small", "youtube_big"]);
        assert_eq!(report.items[0].engagement_rate, 10.0);
        assert_eq!(report.items[1].engagement_rate, 2.0);
        assert_eq!(report.stats.rated_records, 2);
        assert_eq!(report.stats.max_rate, Some(10.0));
        assert_eq!(report.stats.min_rate, Some(2.0));
        assert_eq!(report.stats.mean_rate, Some(6.0));
    }

    #[test]
    fn engagement_report_breaks_rate_ties_deterministically() {
        let records = vec![
            ranked("youtube_b", 100, 5, 0),
            ranked("youtube_a", 100, 5, 0),
            ranked("youtube_c", 200, 10, 0),
        ];
        let report = engagement_report(&records, 2);

        let ids: Vec<&str> = report.items.iter().map(|i| i.content_id.as_str()).collect();
        // All at 5%: more total engagement first, then by id.
        assert_eq!(ids, vec!["youtube_c", "youtube_a"]);
        assert_eq!(report.stats.rated_records, 3);
    }

    #[test]
    fn engagement_report_without_views_is_empty() {
        let report = engagement_report(&[ranked("instagram_1", 0, 10, 2)], 5);
        assert!(report.items.is_empty());
        assert_eq!(report.stats, EngagementStats::default());
    }
}
