//! Trend analytics: sentiment, hashtag and keyword extraction, engagement and
//! trending scores, and dashboard aggregates.
//!
//! Everything except [`store`] is pure over a slice of [`trendscope_core::TrendRecord`].

pub mod engagement;
pub mod scorer;
pub mod sentiment;
pub mod store;
pub mod summary;
pub mod text;
pub mod topics;

pub use engagement::{
    engagement_rate, engagement_report, record_sentiment, trending_score, EngagementReport,
    RecordEngagement,
};
pub use scorer::{lexicon_score, SentimentLabel};
pub use sentiment::{sentiment_report, RecordSentiment, SentimentReport};
pub use store::{engagement_ranking, sentiment, summarize, trending};
pub use summary::{
    aggregate, EngagementStats, HashtagTrend, KeywordCount, ScoredRecord, SentimentDistribution,
    TrendSummary,
};
pub use text::{clean_text, extract_hashtags, extract_keywords};
pub use topics::{trending_topics, TrendingTopic};
