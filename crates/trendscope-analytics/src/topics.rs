//! Hashtag topics ranked by engagement, spread, and freshness.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use trendscope_core::{Platform, TrendRecord};

use crate::engagement::{engagement_rate, hours_since, round3};
use crate::summary::newest_observed_at;

/// A topic must appear on at least this many records to rank.
const MIN_TOPIC_RECORDS: usize = 2;
const GROWTH_SATURATION: f64 = 10.0;
const RECENCY_WINDOW_HOURS: f64 = 168.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingTopic {
    pub hashtag: String,
    pub record_count: usize,
    pub platforms: Vec<Platform>,
    /// Mean engagement rate (percent) over the topic's records that report views.
    pub avg_engagement_rate: f64,
    pub latest_observed_at: DateTime<Utc>,
    pub score: f64,
}

#[derive(Default)]
struct TopicAccumulator {
    count: usize,
    platforms: BTreeSet<Platform>,
    rate_sum: f64,
    rated: usize,
    latest: Option<DateTime<Utc>>,
}

/// Ranks hashtags seen on two or more records.
///
/// `score = 0.4 * min(avg_rate / 10, 1) + 0.4 * min(count / 10, 1)
///        + 0.2 * max(0, 1 - hours_since_latest / 168)`, clamped to `[0, 1]`.
/// Hours are measured from the newest record in the batch.
#[must_use]
pub fn trending_topics(records: &[TrendRecord], limit: usize) -> Vec<TrendingTopic> {
    let Some(as_of) = newest_observed_at(records) else {
        return Vec::new();
    };

    let mut topics: BTreeMap<&str, TopicAccumulator> = BTreeMap::new();
    for record in records {
        let rate = engagement_rate(record);
        for tag in &record.hashtags {
            let acc = topics.entry(tag.as_str()).or_default();
            acc.count += 1;
            acc.platforms.insert(record.platform);
            if let Some(rate) = rate {
                acc.rate_sum += rate;
                acc.rated += 1;
            }
            acc.latest = acc.latest.max(Some(record.observed_at));
        }
    }

    let mut ranked: Vec<TrendingTopic> = topics
        .into_iter()
        .filter(|(_, acc)| acc.count >= MIN_TOPIC_RECORDS)
        .filter_map(|(tag, acc)| {
            let latest = acc.latest?;
            #[allow(clippy::cast_precision_loss)]
            let avg_rate = if acc.rated == 0 {
                0.0
            } else {
                acc.rate_sum / acc.rated as f64
            };
            #[allow(clippy::cast_precision_loss)]
            let growth = (acc.count as f64 / GROWTH_SATURATION).min(1.0);
            let recency = (1.0 - hours_since(latest, as_of) / RECENCY_WINDOW_HOURS).max(0.0);
            let score = 0.4 * (avg_rate / 10.0).min(1.0) + 0.4 * growth + 0.2 * recency;
            Some(TrendingTopic {
                hashtag: tag.to_string(),
                record_count: acc.count,
                platforms: acc.platforms.into_iter().collect(),
                avg_engagement_rate: (avg_rate * 100.0).round() / 100.0,
                latest_observed_at: latest,
                score: round3(score.clamp(0.0, 1.0)),
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.record_count.cmp(&a.record_count))
            .then_with(|| a.hashtag.cmp(&b.hashtag))
    });
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use trendscope_core::RecordSource;

    use super::*;

    fn record(
        platform: Platform,
        id: &str,
        views: i64,
        likes: i64,
        hashtags: &[&str],
        hours_ago: i64,
    ) -> TrendRecord {
        TrendRecord {
            platform,
            content_id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            author: "creator".to_string(),
            url: None,
            views,
            likes,
            comments: 0,
            hashtags: hashtags.iter().map(|h| (*h).to_string()).collect(),
            observed_at: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
                - Duration::hours(hours_ago),
            source: RecordSource::Mock,
        }
    }

    #[test]
    fn empty_input_has_no_topics() {
        assert!(trending_topics(&[], 10).is_empty());
    }

    #[test]
    fn single_use_hashtags_are_excluded() {
        let records = vec![
            record(Platform::YouTube, "a", 100, 10, &["viral", "solo"], 0),
            record(Platform::Instagram, "b", 0, 10, &["viral"], 1),
        ];
        let topics = trending_topics(&records, 10);
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].hashtag, "viral");
        assert_eq!(
            topics[0].platforms,
            vec![Platform::YouTube, Platform::Instagram]
        );
    }

    #[test]
    fn score_combines_rate_growth_and_recency() {
        // Two fresh records at 10% engagement: 0.4 * 1.0 + 0.4 * 0.2 + 0.2 * 1.0
        let records = vec![
            record(Platform::YouTube, "a", 100, 10, &["dance"], 0),
            record(Platform::YouTube, "b", 100, 10, &["dance"], 0),
        ];
        let topics = trending_topics(&records, 10);
        assert_eq!(topics[0].score, 0.68);
        assert_eq!(topics[0].avg_engagement_rate, 10.0);
    }

    #[test]
    fn stale_topics_lose_recency() {
        let records = vec![
            record(Platform::YouTube, "fresh1", 100, 0, &["fresh"], 0),
            record(Platform::YouTube, "fresh2", 100, 0, &["fresh"], 0),
            record(Platform::YouTube, "old1", 100, 0, &["old"], 200),
            record(Platform::YouTube, "old2", 100, 0, &["old"], 200),
        ];
        let topics = trending_topics(&records, 10);
        assert_eq!(topics[0].hashtag, "fresh");
        assert_eq!(topics[0].score, 0.28);
        assert_eq!(topics[1].hashtag, "old");
        assert_eq!(topics[1].score, 0.08);
    }

    #[test]
    fn limit_truncates() {
        let records = vec![
            record(Platform::YouTube, "a", 100, 1, &["x", "y", "z"], 0),
            record(Platform::YouTube, "b", 100, 1, &["x", "y", "z"], 0),
        ];
        assert_eq!(trending_topics(&records, 2).len(), 2);
    }
}
