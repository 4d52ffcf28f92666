//! Read-only `records` and `summary` commands.

use trendscope_analytics::TrendSummary;
use trendscope_core::{AnalyticsQuery, RawAnalyticsQuery, RecordFilter, TrendRecord};

/// List stored records matching the filter.
///
/// # Errors
///
/// Returns an error for invalid filter values or a failed query.
pub(crate) async fn run_records(
    pool: &sqlx::SqlitePool,
    raw: &RawAnalyticsQuery,
) -> anyhow::Result<()> {
    let filter = RecordFilter::parse(raw)?;
    let records = trendscope_db::query_trend_records(pool, &filter).await?;

    if records.is_empty() {
        println!("no records found; run `trendscope collect` first");
        return Ok(());
    }
    print!("{}", format_records(&records));
    Ok(())
}

/// Print the analytics summary for stored records.
///
/// # Errors
///
/// Returns an error for invalid filter values or a failed query.
pub(crate) async fn run_summary(
    pool: &sqlx::SqlitePool,
    raw: &RawAnalyticsQuery,
) -> anyhow::Result<()> {
    let query = AnalyticsQuery::parse(raw)?;
    let summary = trendscope_analytics::summarize(pool, &query).await?;

    if summary.total_records == 0 {
        println!("no records found; run `trendscope collect` first");
        return Ok(());
    }
    print!("{}", format_summary(&summary));
    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('~');
    out
}

pub(crate) fn format_records(records: &[TrendRecord]) -> String {
    let mut out = format!(
        "{:<11}{:<18}{:<10}{:<9}{:<9}TITLE\n",
        "PLATFORM", "OBSERVED", "VIEWS", "LIKES", "COMMENTS"
    );
    for record in records {
        out.push_str(&format!(
            "{:<11}{:<18}{:<10}{:<9}{:<9}{}\n",
            record.platform.as_str(),
            record.observed_at.format("%Y-%m-%d %H:%M"),
            record.views,
            record.likes,
            record.comments,
            truncate(&record.title, 60)
        ));
    }
    out
}

pub(crate) fn format_summary(summary: &TrendSummary) -> String {
    let mut out = String::new();
    let as_of = summary
        .as_of
        .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M UTC").to_string());
    out.push_str(&format!(
        "records: {} (as of {as_of})\n",
        summary.total_records
    ));
    for (platform, count) in &summary.platform_counts {
        out.push_str(&format!("  {:<10}{count}\n", platform.as_str()));
    }

    let s = &summary.sentiment;
    out.push_str(&format!(
        "sentiment: {} positive, {} neutral, {} negative (mean {:.3})\n",
        s.positive, s.neutral, s.negative, s.mean_score
    ));

    out.push_str("\ntop content:\n");
    for item in &summary.top_content {
        out.push_str(&format!(
            "  {:<10}{:>8}  score {:.3}  {}\n",
            item.record.platform.as_str(),
            item.total_engagement,
            item.trending_score,
            truncate(&item.record.title, 50)
        ));
    }

    out.push_str("\ntop hashtags:\n");
    for tag in &summary.top_hashtags {
        out.push_str(&format!(
            "  #{:<20}{:>4}  trend {:.3}\n",
            tag.hashtag, tag.count, tag.trend_score
        ));
    }

    if !summary.top_keywords.is_empty() {
        let keywords: Vec<String> = summary
            .top_keywords
            .iter()
            .map(|k| format!("{} ({})", k.keyword, k.count))
            .collect();
        out.push_str(&format!("\nkeywords: {}\n", keywords.join(", ")));
    }
    out
}
