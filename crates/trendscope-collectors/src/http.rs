//! Shared HTTP plumbing for the live collectors.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use trendscope_core::Platform;

use crate::error::CollectionError;

const CONNECT_TIMEOUT_SECS: u64 = 10;

pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, CollectionError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS.min(timeout_secs.max(1))))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Sends `request` and decodes a 2xx JSON body into `T`.
///
/// 401/403 map to [`CollectionError::Auth`], 429 to
/// [`CollectionError::RateLimited`], any other non-2xx to
/// [`CollectionError::UnexpectedStatus`].
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    platform: Platform,
    context: &str,
    request: RequestBuilder,
) -> Result<T, CollectionError> {
    let response = request.send().await?;
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(CollectionError::Auth {
            platform,
            status: status.as_u16(),
        });
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());
        return Err(CollectionError::RateLimited {
            platform,
            retry_after_secs,
        });
    }

    if !status.is_success() {
        return Err(CollectionError::UnexpectedStatus {
            platform,
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| CollectionError::Deserialize {
        context: context.to_string(),
        source,
    })
}

/// Truncates to at most `max_chars` characters without splitting a code point.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
