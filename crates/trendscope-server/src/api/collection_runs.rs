use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trendscope_core::QueryError;
use trendscope_db::CollectionRunRow;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, map_query_error, ApiError, ApiResponse, AppState};

const DEFAULT_RUNS_LIMIT: i64 = 20;
const MAX_RUNS_LIMIT: i64 = 200;

/// Kept as a raw string so bad values reach the JSON error envelope.
#[derive(Debug, Deserialize)]
pub(super) struct CollectionRunsQuery {
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct CollectionRunItem {
    collection_run_id: Uuid,
    platform: String,
    source: String,
    trigger_source: String,
    status: String,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    records_processed: i64,
    error_kind: Option<String>,
    error_message: Option<String>,
}

impl From<CollectionRunRow> for CollectionRunItem {
    fn from(row: CollectionRunRow) -> Self {
        Self {
            collection_run_id: row.public_id,
            platform: row.platform,
            source: row.source,
            trigger_source: row.trigger_source,
            status: row.status,
            started_at: row.started_at,
            completed_at: row.completed_at,
            records_processed: row.records_processed,
            error_kind: row.error_kind,
            error_message: row.error_message,
        }
    }
}

fn parse_runs_limit(limit: Option<&str>) -> Result<i64, QueryError> {
    trendscope_core::parse_limit(limit, DEFAULT_RUNS_LIMIT, MAX_RUNS_LIMIT)
}

pub(super) async fn list_collection_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CollectionRunsQuery>,
) -> Result<Json<ApiResponse<Vec<CollectionRunItem>>>, ApiError> {
    let limit = parse_runs_limit(query.limit.as_deref())
        .map_err(|e| map_query_error(req_id.0.clone(), &e))?;
    let rows = trendscope_db::list_collection_runs(&state.pool, limit)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows.into_iter().map(CollectionRunItem::from).collect();
    Ok(ApiResponse::new(data, req_id.0))
}
