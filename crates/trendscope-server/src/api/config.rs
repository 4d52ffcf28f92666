use axum::{extract::State, Extension, Json};
use serde::Serialize;
use trendscope_core::{Platform, RecordSource};

use crate::middleware::RequestId;

use super::{ApiResponse, AppState};

/// Configuration a dashboard may display. Credentials are reported only as
/// the collector variant they select.
#[derive(Debug, Serialize)]
pub(super) struct ConfigSnapshot {
    env: String,
    cors_origin: String,
    youtube_source: RecordSource,
    instagram_source: RecordSource,
    youtube_category_id: String,
    youtube_region_code: String,
    collector_max_results: u32,
    collector_request_timeout_secs: u64,
    assistant: AssistantSnapshot,
}

#[derive(Debug, Serialize)]
struct AssistantSnapshot {
    enabled: bool,
    model: String,
    context_size: u32,
}

pub(super) async fn get_config(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<ConfigSnapshot>> {
    let config = &state.config;
    let snapshot = ConfigSnapshot {
        env: config.env.to_string(),
        cors_origin: config.cors_origin.clone(),
        youtube_source: state.collectors.source_for(Platform::YouTube),
        instagram_source: state.collectors.source_for(Platform::Instagram),
        youtube_category_id: config.youtube_category_id.clone(),
        youtube_region_code: config.youtube_region_code.clone(),
        collector_max_results: config.collector_max_results,
        collector_request_timeout_secs: config.collector_request_timeout_secs,
        assistant: AssistantSnapshot {
            enabled: config.assistant_enabled,
            model: config.assistant_model.clone(),
            context_size: config.assistant_context_size,
        },
    };
    ApiResponse::new(snapshot, req_id.0)
}
