use axum::{extract::State, Extension, Json};
use serde::Serialize;
use trendscope_collectors::{build_all_collectors, collect_all, RunOutcome, TriggerSource};
use trendscope_core::RunStatus;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct CollectionReport {
    succeeded: usize,
    failed: usize,
    runs: Vec<RunOutcome>,
}

/// Runs every platform's collector and stores what comes back.
///
/// A collector failure is reported inside `runs` with status `failed`; only a
/// storage failure turns the whole request into an error.
pub(super) async fn trigger_collection(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<CollectionReport>>, ApiError> {
    let collectors = build_all_collectors(&state.collectors).map_err(|e| {
        tracing::error!(error = %e, "failed to build collectors");
        ApiError::new(req_id.0.clone(), "internal_error", "failed to build collectors")
    })?;

    let mut runs = Vec::with_capacity(collectors.len());
    for result in collect_all(&state.pool, &collectors, TriggerSource::Api).await {
        runs.push(result.map_err(|e| map_db_error(req_id.0.clone(), &e))?);
    }

    let succeeded = runs
        .iter()
        .filter(|r| r.status == RunStatus::Succeeded)
        .count();
    let report = CollectionReport {
        succeeded,
        failed: runs.len() - succeeded,
        runs,
    };
    tracing::info!(
        succeeded = report.succeeded,
        failed = report.failed,
        "collection triggered via api"
    );

    Ok(ApiResponse::new(report, req_id.0))
}
