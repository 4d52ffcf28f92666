//! Analytics computed over stored records.

use sqlx::SqlitePool;
use trendscope_core::{AnalyticsQuery, RecordFilter, TrendRecord};
use trendscope_db::{query_trend_records, DbError};

use crate::engagement::{engagement_report, EngagementReport};
use crate::sentiment::{sentiment_report, SentimentReport};
use crate::summary::{aggregate, TrendSummary};
use crate::topics::{trending_topics, TrendingTopic};

async fn load(pool: &SqlitePool, query: &AnalyticsQuery) -> Result<Vec<TrendRecord>, DbError> {
    let records = query_trend_records(pool, &RecordFilter::from(query)).await?;
    tracing::debug!(
        platform = ?query.platform,
        records = records.len(),
        "loaded records for analytics"
    );
    Ok(records)
}

/// Loads matching records and aggregates them.
///
/// # Errors
///
/// Returns [`DbError`] if the records cannot be read.
pub async fn summarize(pool: &SqlitePool, query: &AnalyticsQuery) -> Result<TrendSummary, DbError> {
    let records = load(pool, query).await?;
    Ok(aggregate(&records, query.top_n))
}

/// Loads matching records and ranks their hashtag topics.
///
/// # Errors
///
/// Returns [`DbError`] if the records cannot be read.
pub async fn trending(
    pool: &SqlitePool,
    query: &AnalyticsQuery,
) -> Result<Vec<TrendingTopic>, DbError> {
    let records = load(pool, query).await?;
    Ok(trending_topics(&records, query.top_n))
}

/// Loads matching records and scores their sentiment.
///
/// # Errors
///
/// Returns [`DbError`] if the records cannot be read.
pub async fn sentiment(
    pool: &SqlitePool,
    query: &AnalyticsQuery,
) -> Result<SentimentReport, DbError> {
    let records = load(pool, query).await?;
    Ok(sentiment_report(&records, query.top_n))
}

/// Loads matching records and ranks them by engagement rate.
///
/// # Errors
///
/// Returns [`DbError`] if the records cannot be read.
pub async fn engagement_ranking(
    pool: &SqlitePool,
    query: &AnalyticsQuery,
) -> Result<EngagementReport, DbError> {
    let records = load(pool, query).await?;
    Ok(engagement_report(&records, query.top_n))
}
