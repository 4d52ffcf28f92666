//! Database operations for `collection_runs`.
//!
//! A run is inserted as `running` and closed exactly once, as either
//! `succeeded` or `failed`. Every close is guarded by `status = 'running'`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use trendscope_core::{Platform, RecordSource};
use uuid::Uuid;

use crate::DbError;

/// A row from the `collection_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CollectionRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub platform: String,
    /// Which collector variant ran: `live` or `mock`.
    pub source: String,
    /// `cli` or `api`.
    pub trigger_source: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub records_processed: i64,
    /// `auth`, `rate_limit`, `transport`, `deserialize`, or `storage`.
    pub error_kind: Option<String>,
    pub error_message: Option<String>,
}

const RUN_COLUMNS: &str = "id, public_id, platform, source, trigger_source, status, \
     started_at, completed_at, records_processed, error_kind, error_message";

/// Inserts a new run in `running` status with `started_at = now`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn start_collection_run(
    pool: &SqlitePool,
    platform: Platform,
    source: RecordSource,
    trigger_source: &str,
) -> Result<CollectionRunRow, DbError> {
    let row = sqlx::query_as::<_, CollectionRunRow>(&format!(
        "INSERT INTO collection_runs (public_id, platform, source, trigger_source, status, started_at) \
         VALUES (?1, ?2, ?3, ?4, 'running', ?5) \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(platform.as_str())
    .bind(source.as_str())
    .bind(trigger_source)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as `succeeded`, setting `completed_at` and `records_processed`.
///
/// # Errors
///
/// Returns [`DbError::InvalidCollectionRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_collection_run(
    pool: &SqlitePool,
    id: i64,
    records_processed: i64,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE collection_runs \
         SET status = 'succeeded', completed_at = ?1, records_processed = ?2 \
         WHERE id = ?3 AND status = 'running'",
    )
    .bind(Utc::now())
    .bind(records_processed)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidCollectionRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run as `failed`, recording the error category and message.
///
/// # Errors
///
/// Returns [`DbError::InvalidCollectionRunTransition`] if the run is not
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_collection_run(
    pool: &SqlitePool,
    id: i64,
    error_kind: &str,
    error_message: &str,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE collection_runs \
         SET status = 'failed', completed_at = ?1, error_kind = ?2, error_message = ?3 \
         WHERE id = ?4 AND status = 'running'",
    )
    .bind(Utc::now())
    .bind(error_kind)
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidCollectionRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_collection_run(pool: &SqlitePool, id: i64) -> Result<CollectionRunRow, DbError> {
    sqlx::query_as::<_, CollectionRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM collection_runs WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Returns the most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_collection_runs(
    pool: &SqlitePool,
    limit: i64,
) -> Result<Vec<CollectionRunRow>, DbError> {
    let rows = sqlx::query_as::<_, CollectionRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM collection_runs \
         ORDER BY started_at DESC, id DESC \
         LIMIT ?1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
