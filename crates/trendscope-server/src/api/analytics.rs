use axum::{
    extract::{Query, State},
    Extension, Json,
};
use trendscope_analytics::{EngagementReport, SentimentReport, TrendSummary, TrendingTopic};
use trendscope_core::{AnalyticsQuery, RawAnalyticsQuery};

use crate::middleware::RequestId;

use super::{map_db_error, map_query_error, ApiError, ApiResponse, AppState};

fn parse_query(req_id: &RequestId, raw: &RawAnalyticsQuery) -> Result<AnalyticsQuery, ApiError> {
    AnalyticsQuery::parse(raw).map_err(|e| map_query_error(req_id.0.clone(), &e))
}

pub(super) async fn get_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(raw): Query<RawAnalyticsQuery>,
) -> Result<Json<ApiResponse<TrendSummary>>, ApiError> {
    let query = parse_query(&req_id, &raw)?;
    let summary = trendscope_analytics::summarize(&state.pool, &query)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(summary, req_id.0))
}

pub(super) async fn get_trending(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(raw): Query<RawAnalyticsQuery>,
) -> Result<Json<ApiResponse<Vec<TrendingTopic>>>, ApiError> {
    let query = parse_query(&req_id, &raw)?;
    let topics = trendscope_analytics::trending(&state.pool, &query)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(topics, req_id.0))
}

pub(super) async fn get_sentiment(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(raw): Query<RawAnalyticsQuery>,
) -> Result<Json<ApiResponse<SentimentReport>>, ApiError> {
    let query = parse_query(&req_id, &raw)?;
    let report = trendscope_analytics::sentiment(&state.pool, &query)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(report, req_id.0))
}

pub(super) async fn get_engagement(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(raw): Query<RawAnalyticsQuery>,
) -> Result<Json<ApiResponse<EngagementReport>>, ApiError> {
    let query = parse_query(&req_id, &raw)?;
    let report = trendscope_analytics::engagement_ranking(&state.pool, &query)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(ApiResponse::new(report, req_id.0))
}
