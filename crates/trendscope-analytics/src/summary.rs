//! Pure aggregation of a batch of records into a dashboard summary.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use trendscope_core::{Platform, TrendRecord};

use crate::engagement::{engagement_rate, record_sentiment, round3, trending_score};
use crate::scorer::SentimentLabel;
use crate::text::extract_keywords;

/// Hashtags containing any of these get a 1.5x trend boost.
const TRENDING_MARKERS: &[&str] = &["viral", "trending", "hot", "breaking", "new", "latest"];

/// A record together with every score computed for it.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: TrendRecord,
    pub total_engagement: i64,
    pub engagement_rate: Option<f64>,
    pub trending_score: f64,
    pub sentiment_score: f32,
    pub sentiment: SentimentLabel,
}

impl ScoredRecord {
    #[must_use]
    pub fn new(record: TrendRecord, as_of: DateTime<Utc>) -> Self {
        let sentiment_score = record_sentiment(&record);
        Self {
            total_engagement: record.total_engagement(),
            engagement_rate: engagement_rate(&record).map(round2),
            trending_score: trending_score(&record, as_of),
            sentiment_score,
            sentiment: SentimentLabel::classify(sentiment_score),
            record,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    /// Mean lexicon score across all records; `0.0` for an empty batch.
    pub mean_score: f64,
}

impl SentimentDistribution {
    pub(crate) fn from_scores<I: IntoIterator<Item = f32>>(scores: I) -> Self {
        let mut dist = Self::default();
        let mut sum = 0.0_f64;
        let mut n = 0_usize;
        for score in scores {
            match SentimentLabel::classify(score) {
                SentimentLabel::Positive => dist.positive += 1,
                SentimentLabel::Neutral => dist.neutral += 1,
                SentimentLabel::Negative => dist.negative += 1,
            }
            sum += f64::from(score);
            n += 1;
        }
        if n > 0 {
            #[allow(clippy::cast_precision_loss)]
            let mean = sum / n as f64;
            dist.mean_score = round3(mean);
        }
        dist
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HashtagTrend {
    pub hashtag: String,
    pub count: usize,
    pub trend_score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

/// Engagement-rate statistics over records that report views.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngagementStats {
    pub rated_records: usize,
    pub mean_rate: Option<f64>,
    pub max_rate: Option<f64>,
    pub min_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendSummary {
    /// Newest `observed_at` in the batch; recency is measured from here.
    pub as_of: Option<DateTime<Utc>>,
    pub total_records: usize,
    pub platform_counts: BTreeMap<Platform, usize>,
    pub top_content: Vec<ScoredRecord>,
    pub sentiment: SentimentDistribution,
    pub top_hashtags: Vec<HashtagTrend>,
    pub top_keywords: Vec<KeywordCount>,
    pub engagement: EngagementStats,
}

/// Summarizes `records`. The result depends only on the input, never on the
/// wall clock, so the same batch always yields the same summary.
///
/// `top_n` caps the content, hashtag, and keyword lists.
#[must_use]
pub fn aggregate(records: &[TrendRecord], top_n: usize) -> TrendSummary {
    let as_of = newest_observed_at(records);
    let reference = as_of.unwrap_or(DateTime::UNIX_EPOCH);

    let mut platform_counts: BTreeMap<Platform, usize> =
        Platform::ALL.iter().map(|p| (*p, 0)).collect();
    for record in records {
        *platform_counts.entry(record.platform).or_insert(0) += 1;
    }

    let mut ranked: Vec<&TrendRecord> = records.iter().collect();
    ranked.sort_by(|a, b| compare_by_engagement(a, b));
    let top_content = ranked
        .into_iter()
        .take(top_n)
        .map(|r| ScoredRecord::new(r.clone(), reference))
        .collect();

    let sentiment = SentimentDistribution::from_scores(records.iter().map(record_sentiment));

    let top_keywords = extract_keywords(
        records
            .iter()
            .flat_map(|r| [r.title.as_str(), r.description.as_str()]),
        top_n,
    )
    .into_iter()
    .map(|(keyword, count)| KeywordCount { keyword, count })
    .collect();

    TrendSummary {
        as_of,
        total_records: records.len(),
        platform_counts,
        top_content,
        sentiment,
        top_hashtags: top_hashtags(records, top_n),
        top_keywords,
        engagement: engagement_stats(records),
    }
}

pub(crate) fn newest_observed_at(records: &[TrendRecord]) -> Option<DateTime<Utc>> {
    records.iter().map(|r| r.observed_at).max()
}

/// Likes plus comments descending, then views descending, then `content_id`.
fn compare_by_engagement(a: &TrendRecord, b: &TrendRecord) -> Ordering {
    b.total_engagement()
        .cmp(&a.total_engagement())
        .then_with(|| b.views.cmp(&a.views))
        .then_with(|| a.content_id.cmp(&b.content_id))
        .then_with(|| a.platform.cmp(&b.platform))
}

fn top_hashtags(records: &[TrendRecord], top_n: usize) -> Vec<HashtagTrend> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        for tag in &record.hashtags {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    let total = records.len();
    let mut trends: Vec<HashtagTrend> = counts
        .into_iter()
        .map(|(tag, count)| HashtagTrend {
            hashtag: tag.to_string(),
            count,
            trend_score: hashtag_trend_score(tag, count, total),
        })
        .collect();
    trends.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.hashtag.cmp(&b.hashtag)));
    trends.truncate(top_n);
    trends
}

/// `count / total`, boosted 1.5x for trend-marker tags, capped at 1.
pub(crate) fn hashtag_trend_score(tag: &str, count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let frequency = count as f64 / total as f64;
    let tag = tag.to_lowercase();
    let boost = if TRENDING_MARKERS.iter().any(|m| tag.contains(m)) {
        1.5
    } else {
        1.0
    };
    round3((frequency * boost).min(1.0))
}

pub(crate) fn engagement_stats(records: &[TrendRecord]) -> EngagementStats {
    let rates: Vec<f64> = records.iter().filter_map(engagement_rate).collect();
    if rates.is_empty() {
        return EngagementStats::default();
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = rates.iter().sum::<f64>() / rates.len() as f64;
    let max = rates.iter().copied().fold(f64::MIN, f64::max);
    let min = rates.iter().copied().fold(f64::MAX, f64::min);
    EngagementStats {
        rated_records: rates.len(),
        mean_rate: Some(round2(mean)),
        max_rate: Some(round2(max)),
        min_rate: Some(round2(min)),
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[path = "summary_test.rs"]
mod tests;
