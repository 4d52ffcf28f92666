use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use trendscope_collectors::{build_collector, CollectionError};
use trendscope_core::{Platform, RecordSource, TrendRecord};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct PlatformPreview {
    platform: Platform,
    source: RecordSource,
    count: usize,
    records: Vec<TrendRecord>,
}

fn map_collection_error(request_id: String, error: &CollectionError) -> ApiError {
    tracing::warn!(kind = error.kind(), error = %error, "platform preview failed");
    ApiError::new(request_id, "upstream_error", error.to_string())
}

/// Fetches a platform's current batch straight from its collector. Nothing
/// is stored and no collection run is recorded.
pub(super) async fn preview_trending(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(platform): Path<String>,
) -> Result<Json<ApiResponse<PlatformPreview>>, ApiError> {
    let platform: Platform = platform
        .parse()
        .map_err(|e: trendscope_core::ParseEnumError| {
            ApiError::new(req_id.0.clone(), "bad_request", e.to_string())
        })?;

    let collector = build_collector(platform, &state.collectors)
        .map_err(|e| map_collection_error(req_id.0.clone(), &e))?;
    let records = collector
        .collect()
        .await
        .map_err(|e| map_collection_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(
        PlatformPreview {
            platform,
            source: collector.source(),
            count: records.len(),
            records,
        },
        req_id.0,
    ))
}
