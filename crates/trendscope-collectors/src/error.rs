use thiserror::Error;
use trendscope_core::Platform;

/// Errors a collector can raise while fetching one platform's content.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// The platform rejected the credential (HTTP 401 or 403).
    #[error("{platform} rejected the configured credential (HTTP {status})")]
    Auth { platform: Platform, status: u16 },

    /// HTTP 429. `retry_after_secs` comes from the `Retry-After` header when present.
    #[error("rate limited by {platform} (retry after {retry_after_secs:?}s)")]
    RateLimited {
        platform: Platform,
        retry_after_secs: Option<u64>,
    },

    /// Network failure, timeout, or TLS error from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {platform}")]
    UnexpectedStatus { platform: Platform, status: u16 },

    /// The response body did not match the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl CollectionError {
    /// Category stored in `collection_runs.error_kind`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            CollectionError::Auth { .. } => "auth",
            CollectionError::RateLimited { .. } => "rate_limit",
            CollectionError::Http(_) | CollectionError::UnexpectedStatus { .. } => "transport",
            CollectionError::Deserialize { .. } => "deserialize",
        }
    }
}
