//! Single-retry policy for platform rate limits.
//!
//! Only [`CollectionError::RateLimited`] is retried, and only once. Auth,
//! transport, and decode failures are returned on the first occurrence.

use std::future::Future;
use std::time::Duration;

use crate::error::CollectionError;

/// Upper bound on how long a `Retry-After` header can make us wait.
const MAX_DELAY_MS: u64 = 30_000;

/// Runs `operation`, retrying once after a jittered delay if it reports a
/// rate limit.
///
/// The delay is the server's `Retry-After` (capped at 30 s) when given,
/// otherwise `backoff_ms`, scaled by a random factor in `[0.75, 1.25)`.
pub(crate) async fn retry_once_on_rate_limit<T, F, Fut>(
    backoff_ms: u64,
    mut operation: F,
) -> Result<T, CollectionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CollectionError>>,
{
    match operation().await {
        Err(CollectionError::RateLimited {
            platform,
            retry_after_secs,
        }) => {
            let base_ms = retry_after_secs
                .map_or(backoff_ms, |secs| secs.saturating_mul(1_000))
                .min(MAX_DELAY_MS);
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::cast_precision_loss
            )]
            let delay_ms = (base_ms as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
            tracing::warn!(
                %platform,
                delay_ms,
                "rate limited; retrying once after back-off"
            );
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            operation().await
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use trendscope_core::Platform;

    use super::*;

    fn rate_limited() -> CollectionError {
        CollectionError::RateLimited {
            platform: Platform::YouTube,
            retry_after_secs: Some(0),
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_once_on_rate_limit(0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, CollectionError>(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_rate_limit_once_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_once_on_rate_limit(0, || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(rate_limited())
                } else {
                    Ok(3_u32)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_second_rate_limit() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_once_on_rate_limit(0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(rate_limited())
            }
        })
        .await;
        assert!(matches!(result, Err(CollectionError::RateLimited { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2, "at most one retry");
    }

    #[tokio::test]
    async fn does_not_retry_auth_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_once_on_rate_limit(0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(CollectionError::Auth {
                    platform: Platform::Instagram,
                    status: 401,
                })
            }
        })
        .await;
        assert!(matches!(result, Err(CollectionError::Auth { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn does_not_retry_unexpected_status() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_once_on_rate_limit(0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(CollectionError::UnexpectedStatus {
                    platform: Platform::YouTube,
                    status: 503,
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
