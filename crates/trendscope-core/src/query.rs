use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

use crate::trend::Platform;

pub const DEFAULT_TOP_N: usize = 10;
pub const MAX_TOP_N: usize = 100;
pub const DEFAULT_RECORD_LIMIT: i64 = 50;
pub const MAX_RECORD_LIMIT: i64 = 500;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("unknown platform \"{0}\" (expected youtube or instagram)")]
    InvalidPlatform(String),

    #[error("invalid {field} \"{value}\" (expected RFC 3339 or YYYY-MM-DD)")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("since ({since}) is after until ({until})")]
    InvertedRange {
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    },

    #[error("top_n must be an integer in 1..={MAX_TOP_N}, got \"{0}\"")]
    TopNOutOfRange(String),

    #[error("limit must be an integer in 1..={max}, got \"{value}\"")]
    LimitOutOfRange { value: String, max: i64 },
}

/// Query parameters exactly as received from a caller, before validation.
///
/// Every field is a string so malformed values surface as [`QueryError`]
/// instead of an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAnalyticsQuery {
    pub platform: Option<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub top_n: Option<String>,
    pub limit: Option<String>,
}

/// Validated filter for analytics reads. Date bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsQuery {
    pub platform: Option<Platform>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub top_n: usize,
}

impl Default for AnalyticsQuery {
    fn default() -> Self {
        Self {
            platform: None,
            since: None,
            until: None,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl AnalyticsQuery {
    /// Validate raw parameters. `limit` is ignored here.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] for an unknown platform, an unparseable or
    /// inverted date range, or `top_n` outside `1..=100`.
    pub fn parse(raw: &RawAnalyticsQuery) -> Result<Self, QueryError> {
        let (platform, since, until) = parse_scope(raw)?;

        let top_n = match non_blank(raw.top_n.as_deref()) {
            None => DEFAULT_TOP_N,
            Some(value) => value
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=MAX_TOP_N).contains(n))
                .ok_or_else(|| QueryError::TopNOutOfRange(value.to_string()))?,
        };

        Ok(Self {
            platform,
            since,
            until,
            top_n,
        })
    }
}

/// Storage-level record filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub platform: Option<Platform>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    /// `None` returns every matching row.
    pub limit: Option<i64>,
}

impl RecordFilter {
    /// Validate raw parameters for a record listing. `top_n` is ignored here;
    /// a missing `limit` becomes [`DEFAULT_RECORD_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] for an unknown platform, an unparseable or
    /// inverted date range, or `limit` outside `1..=500`.
    pub fn parse(raw: &RawAnalyticsQuery) -> Result<Self, QueryError> {
        let (platform, since, until) = parse_scope(raw)?;

        let limit = parse_limit(raw.limit.as_deref(), DEFAULT_RECORD_LIMIT, MAX_RECORD_LIMIT)?;

        Ok(Self {
            platform,
            since,
            until,
            limit: Some(limit),
        })
    }

    #[must_use]
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform: Some(platform),
            ..Self::default()
        }
    }
}

impl From<&AnalyticsQuery> for RecordFilter {
    fn from(query: &AnalyticsQuery) -> Self {
        Self {
            platform: query.platform,
            since: query.since,
            until: query.until,
            limit: None,
        }
    }
}

/// Parses an optional row limit; blank or missing yields `default`.
///
/// # Errors
///
/// Returns [`QueryError::LimitOutOfRange`] unless the value is an integer in
/// `1..=max`.
pub fn parse_limit(raw: Option<&str>, default: i64, max: i64) -> Result<i64, QueryError> {
    match non_blank(raw) {
        None => Ok(default),
        Some(value) => value
            .parse::<i64>()
            .ok()
            .filter(|n| (1..=max).contains(n))
            .ok_or_else(|| QueryError::LimitOutOfRange {
                value: value.to_string(),
                max,
            }),
    }
}

type Scope = (
    Option<Platform>,
    Option<DateTime<Utc>>,
    Option<DateTime<Utc>>,
);

fn parse_scope(raw: &RawAnalyticsQuery) -> Result<Scope, QueryError> {
    let platform = non_blank(raw.platform.as_deref())
        .map(|p| {
            p.parse::<Platform>()
                .map_err(|_| QueryError::InvalidPlatform(p.to_string()))
        })
        .transpose()?;

    let since = non_blank(raw.since.as_deref())
        .map(|v| parse_bound("since", v, NaiveTime::MIN))
        .transpose()?;
    let until = non_blank(raw.until.as_deref())
        .map(|v| parse_bound("until", v, end_of_day()))
        .transpose()?;

    if let (Some(since), Some(until)) = (since, until) {
        if since > until {
            return Err(QueryError::InvertedRange { since, until });
        }
    }

    Ok((platform, since, until))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DD`, which is pinned to `day_time` UTC.
fn parse_bound(
    field: &'static str,
    value: &str,
    day_time: NaiveTime,
) -> Result<DateTime<Utc>, QueryError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(day_time).and_utc())
        .map_err(|_| QueryError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}
