//! Shared configuration and domain types for trendscope.

mod app_config;
mod config;
mod hashtags;
mod query;
mod trend;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, DEV_SECRET_KEY};
pub use config::{load_app_config, load_app_config_from_env};
pub use hashtags::{extract_hashtags, MAX_HASHTAGS};
pub use query::{
    parse_limit, AnalyticsQuery, QueryError, RawAnalyticsQuery, RecordFilter, DEFAULT_RECORD_LIMIT,
    DEFAULT_TOP_N, MAX_RECORD_LIMIT, MAX_TOP_N,
};
pub use trend::{ParseEnumError, Platform, RecordSource, RunStatus, TrendRecord};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
