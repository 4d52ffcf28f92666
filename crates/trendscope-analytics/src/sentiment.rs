//! Per-record sentiment listing.

use serde::Serialize;
use trendscope_core::{Platform, TrendRecord};

use crate::engagement::record_sentiment;
use crate::scorer::SentimentLabel;
use crate::summary::SentimentDistribution;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSentiment {
    pub platform: Platform,
    pub content_id: String,
    pub title: String,
    pub score: f32,
    pub label: SentimentLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentReport {
    pub items: Vec<RecordSentiment>,
    /// Covers every input record, not only the listed items.
    pub distribution: SentimentDistribution,
}

/// Scores each record. Items keep input order and are capped at `top_n`.
#[must_use]
pub fn sentiment_report(records: &[TrendRecord], top_n: usize) -> SentimentReport {
    let scores: Vec<f32> = records.iter().map(record_sentiment).collect();

    let items = records
        .iter()
        .zip(&scores)
        .take(top_n)
        .map(|(record, &score)| RecordSentiment {
            platform: record.platform,
            content_id: record.content_id.clone(),
            title: record.title.clone(),
            score,
            label: SentimentLabel::classify(score),
        })
        .collect();

    SentimentReport {
        items,
        distribution: SentimentDistribution::from_scores(scores),
    }
}
