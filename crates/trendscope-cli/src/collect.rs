//! `collect` command: run collectors and store their records.
//!
//! One platform failing never stops the others. The command itself fails only
//! when every run failed or storage is unavailable.

use trendscope_collectors::{
    build_all_collectors, build_collector, collect_all, CollectorSettings, RunOutcome,
    TriggerSource,
};
use trendscope_core::{AppConfig, Platform, RunStatus};

/// Parses an optional `--platform` value.
///
/// # Errors
///
/// Returns an error naming the accepted values when `raw` is not a platform.
pub(crate) fn parse_platform_filter(raw: Option<&str>) -> anyhow::Result<Option<Platform>> {
    raw.map(|value| {
        value
            .parse::<Platform>()
            .map_err(|e| anyhow::anyhow!("{e}; expected youtube or instagram"))
    })
    .transpose()
}

pub(crate) async fn run_collect(
    pool: &sqlx::SqlitePool,
    config: &AppConfig,
    platform: Option<&str>,
) -> anyhow::Result<()> {
    let settings = CollectorSettings::from_app_config(config);
    let collectors = match parse_platform_filter(platform)? {
        Some(platform) => vec![build_collector(platform, &settings)?],
        None => build_all_collectors(&settings)?,
    };

    let mut outcomes = Vec::with_capacity(collectors.len());
    for result in collect_all(pool, &collectors, TriggerSource::Cli).await {
        outcomes.push(result?);
    }

    print!("{}", format_outcomes(&outcomes));

    let failed = outcomes
        .iter()
        .filter(|o| o.status == RunStatus::Failed)
        .count();
    if failed > 0 && failed == outcomes.len() {
        anyhow::bail!("all {failed} collection runs failed");
    }
    Ok(())
}

pub(crate) fn format_outcomes(outcomes: &[RunOutcome]) -> String {
    let mut out = format!(
        "{:<12}{:<8}{:<11}{:<11}{:<9}ERROR\n",
        "PLATFORM", "SOURCE", "STATUS", "COLLECTED", "WRITTEN"
    );
    for outcome in outcomes {
        let error = match (&outcome.error_kind, &outcome.error_message) {
            (Some(kind), Some(message)) => format!("{kind}: {message}"),
            (Some(kind), None) => kind.clone(),
            _ => String::new(),
        };
        out.push_str(&format!(
            "{:<12}{:<8}{:<11}{:<11}{:<9}{}\n",
            outcome.platform.as_str(),
            outcome.source.as_str(),
            outcome.status.as_str(),
            outcome.records_collected,
            outcome.records_written,
            error
        ));
    }
    out
}

#[cfg(test)]
#[path = "collect_test.rs"]
mod tests;
