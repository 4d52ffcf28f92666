//! Collection-run orchestration: invoke a collector, upsert its records, and
//! close the run as succeeded or failed.

use futures::future::join_all;
use serde::Serialize;
use sqlx::SqlitePool;
use trendscope_core::{Platform, RecordSource, RunStatus};
use trendscope_db::DbError;
use uuid::Uuid;

use crate::TrendCollector;

/// What started a collection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    Cli,
    Api,
}

impl TriggerSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerSource::Cli => "cli",
            TriggerSource::Api => "api",
        }
    }
}

/// Result of one collector invocation, as recorded in `collection_runs`.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub run_id: i64,
    pub public_id: Uuid,
    pub platform: Platform,
    pub source: RecordSource,
    pub status: RunStatus,
    /// Records the collector returned.
    pub records_collected: usize,
    /// Rows actually inserted or changed in storage.
    pub records_written: u64,
    pub error_kind: Option<String>,
    pub error_message: Option<String>,
}

/// Runs one collector end to end.
///
/// A collector failure is not an error here: the run is closed as `failed`
/// with the error's category, and the outcome says so. Storage failures are
/// returned as `Err` after a best-effort attempt to mark the run failed.
///
/// # Errors
///
/// Returns [`DbError`] if the run cannot be opened, the records cannot be
/// upserted, or the run cannot be closed.
pub async fn run_collection(
    pool: &SqlitePool,
    collector: &dyn TrendCollector,
    trigger: TriggerSource,
) -> Result<RunOutcome, DbError> {
    let platform = collector.platform();
    let source = collector.source();
    let run =
        trendscope_db::start_collection_run(pool, platform, source, trigger.as_str()).await?;
    tracing::info!(
        run_id = run.id,
        %platform,
        %source,
        trigger = trigger.as_str(),
        "collection run started"
    );

    let mut outcome = RunOutcome {
        run_id: run.id,
        public_id: run.public_id,
        platform,
        source,
        status: RunStatus::Running,
        records_collected: 0,
        records_written: 0,
        error_kind: None,
        error_message: None,
    };

    let records = match collector.collect().await {
        Ok(records) => records,
        Err(err) => {
            let message = err.to_string();
            tracing::warn!(
                run_id = run.id,
                %platform,
                kind = err.kind(),
                error = %message,
                "collector failed"
            );
            trendscope_db::fail_collection_run(pool, run.id, err.kind(), &message).await?;
            outcome.status = RunStatus::Failed;
            outcome.error_kind = Some(err.kind().to_string());
            outcome.error_message = Some(message);
            return Ok(outcome);
        }
    };
    outcome.records_collected = records.len();

    let written = match trendscope_db::upsert_trend_records(pool, &records).await {
        Ok(written) => written,
        Err(err) => {
            fail_run_best_effort(pool, run.id, &err).await;
            return Err(err);
        }
    };
    outcome.records_written = written;

    let processed = i64::try_from(records.len()).unwrap_or(i64::MAX);
    trendscope_db::complete_collection_run(pool, run.id, processed).await?;
    outcome.status = RunStatus::Succeeded;

    tracing::info!(
        run_id = run.id,
        %platform,
        collected = outcome.records_collected,
        written,
        "collection run succeeded"
    );
    Ok(outcome)
}

/// Runs every collector concurrently, each under its own collection run.
///
/// Results come back in the same order as `collectors`; one platform's
/// failure never affects another's.
pub async fn collect_all(
    pool: &SqlitePool,
    collectors: &[Box<dyn TrendCollector>],
    trigger: TriggerSource,
) -> Vec<Result<RunOutcome, DbError>> {
    join_all(
        collectors
            .iter()
            .map(|collector| run_collection(pool, collector.as_ref(), trigger)),
    )
    .await
}

async fn fail_run_best_effort(pool: &SqlitePool, run_id: i64, err: &DbError) {
    if let Err(mark_err) =
        trendscope_db::fail_collection_run(pool, run_id, "storage", &err.to_string()).await
    {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark collection run as failed"
        );
    }
}
