use axum::{
    extract::{Query, State},
    Extension, Json,
};
use trendscope_core::{RawAnalyticsQuery, RecordFilter, TrendRecord};

use crate::middleware::RequestId;

use super::{map_db_error, map_query_error, ApiError, ApiResponse, AppState};

pub(super) async fn list_records(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(raw): Query<RawAnalyticsQuery>,
) -> Result<Json<ApiResponse<Vec<TrendRecord>>>, ApiError> {
    let filter = RecordFilter::parse(&raw).map_err(|e| map_query_error(req_id.0.clone(), &e))?;

    let records = trendscope_db::query_trend_records(&state.pool, &filter)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(records, req_id.0))
}
