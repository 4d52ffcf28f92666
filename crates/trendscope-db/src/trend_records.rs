//! Database operations for the `trend_records` table.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use trendscope_core::{Platform, RecordFilter, TrendRecord};

use crate::DbError;

/// A row from the `trend_records` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TrendRecordRow {
    pub platform: String,
    pub content_id: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: Option<String>,
    pub views: i64,
    pub likes: i64,
    pub comments: i64,
    pub hashtags: Json<Vec<String>>,
    pub observed_at: DateTime<Utc>,
    pub source: String,
}

impl TryFrom<TrendRecordRow> for TrendRecord {
    type Error = DbError;

    fn try_from(row: TrendRecordRow) -> Result<Self, Self::Error> {
        let invalid = |e: trendscope_core::ParseEnumError| DbError::InvalidRow {
            table: "trend_records",
            reason: e.to_string(),
        };
        Ok(TrendRecord {
            platform: row.platform.parse().map_err(invalid)?,
            content_id: row.content_id,
            title: row.title,
            description: row.description,
            author: row.author,
            url: row.url,
            views: row.views,
            likes: row.likes,
            comments: row.comments,
            hashtags: row.hashtags.0,
            observed_at: row.observed_at,
            source: row.source.parse().map_err(invalid)?,
        })
    }
}

const SELECT_COLUMNS: &str = "SELECT platform, content_id, title, description, author, url, \
     views, likes, comments, hashtags, observed_at, source \
     FROM trend_records";

/// Insert or update a batch of records inside one transaction.
///
/// Conflicts on `(platform, content_id)` overwrite the stored fields only when
/// at least one of them differs, so re-ingesting identical data is a no-op.
/// Returns the number of rows actually inserted or changed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails; the whole batch is then
/// rolled back.
pub async fn upsert_trend_records(
    pool: &SqlitePool,
    records: &[TrendRecord],
) -> Result<u64, DbError> {
    if records.is_empty() {
        return Ok(0);
    }

    let now = Utc::now();
    let mut written = 0_u64;
    let mut tx = pool.begin().await?;

    for record in records {
        let record = record.clone().normalized();
        let result = sqlx::query(
            "INSERT INTO trend_records \
                 (platform, content_id, title, description, author, url, \
                  views, likes, comments, hashtags, observed_at, source, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13) \
             ON CONFLICT (platform, content_id) DO UPDATE SET \
                 title       = excluded.title, \
                 description = excluded.description, \
                 author      = excluded.author, \
                 url         = excluded.url, \
                 views       = excluded.views, \
                 likes       = excluded.likes, \
                 comments    = excluded.comments, \
                 hashtags    = excluded.hashtags, \
                 observed_at = excluded.observed_at, \
                 source      = excluded.source, \
                 updated_at  = excluded.updated_at \
             WHERE trend_records.title       IS NOT excluded.title \
                OR trend_records.description IS NOT excluded.description \
                OR trend_records.author      IS NOT excluded.author \
                OR trend_records.url         IS NOT excluded.url \
                OR trend_records.views       IS NOT excluded.views \
                OR trend_records.likes       IS NOT excluded.likes \
                OR trend_records.comments    IS NOT excluded.comments \
                OR trend_records.hashtags    IS NOT excluded.hashtags \
                OR trend_records.observed_at IS NOT excluded.observed_at \
                OR trend_records.source      IS NOT excluded.source",
        )
        .bind(record.platform.as_str())
        .bind(&record.content_id)
        .bind(&record.title)
        .bind(&record.description)
        .bind(&record.author)
        .bind(record.url.as_deref())
        .bind(record.views)
        .bind(record.likes)
        .bind(record.comments)
        .bind(Json(&record.hashtags))
        .bind(record.observed_at)
        .bind(record.source.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        written += result.rows_affected();
    }

    tx.commit().await?;
    tracing::debug!(records = records.len(), written, "trend records upserted");
    Ok(written)
}

/// Returns records matching `filter`, newest first.
///
/// Ties on `observed_at` are broken by platform then `content_id` so the
/// order is stable across calls.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::InvalidRow`]
/// if a stored row holds an unknown platform or source.
pub async fn query_trend_records(
    pool: &SqlitePool,
    filter: &RecordFilter,
) -> Result<Vec<TrendRecord>, DbError> {
    let mut builder = QueryBuilder::<Sqlite>::new(SELECT_COLUMNS);
    push_filter(&mut builder, filter);
    builder.push(" ORDER BY observed_at DESC, platform ASC, content_id ASC");
    if let Some(limit) = filter.limit {
        builder.push(" LIMIT ").push_bind(limit);
    }

    let rows = builder
        .build_query_as::<TrendRecordRow>()
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(TrendRecord::try_from).collect()
}

/// Counts records per platform. Every platform appears, with zero when it has
/// no matching rows. `filter.limit` is ignored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::InvalidRow`]
/// for an unknown stored platform.
pub async fn count_trend_records_by_platform(
    pool: &SqlitePool,
    filter: &RecordFilter,
) -> Result<BTreeMap<Platform, i64>, DbError> {
    let mut builder =
        QueryBuilder::<Sqlite>::new("SELECT platform, COUNT(*) AS n FROM trend_records");
    push_filter(&mut builder, filter);
    builder.push(" GROUP BY platform");

    let rows: Vec<(String, i64)> = builder.build_query_as().fetch_all(pool).await?;

    let mut counts: BTreeMap<Platform, i64> = Platform::ALL.iter().map(|p| (*p, 0)).collect();
    for (platform, n) in rows {
        let platform = platform
            .parse::<Platform>()
            .map_err(|e| DbError::InvalidRow {
                table: "trend_records",
                reason: e.to_string(),
            })?;
        counts.insert(platform, n);
    }
    Ok(counts)
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &RecordFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(platform) = filter.platform {
        builder.push(" AND platform = ").push_bind(platform.as_str());
    }
    if let Some(since) = filter.since {
        builder.push(" AND observed_at >= ").push_bind(since);
    }
    if let Some(until) = filter.until {
        builder.push(" AND observed_at <= ").push_bind(until);
    }
}
