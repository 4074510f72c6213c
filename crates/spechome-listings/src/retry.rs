//! Retry with exponential back-off and jitter for listings API calls.
//!
//! Every upstream request is billed, so retries are off unless configured.

use std::future::Future;
use std::time::Duration;

use crate::error::ListingsError;

const MAX_DELAY_SECS: u64 = 60;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// Rate limiting, network timeouts and connection failures, and 5xx responses
/// are transient. Everything else is returned immediately.
pub(crate) fn is_retriable(err: &ListingsError) -> bool {
    match err {
        ListingsError::RateLimited { .. } => true,
        ListingsError::Http(e) => e.is_timeout() || e.is_connect(),
        ListingsError::UnexpectedStatus { status, .. } => *status >= 500,
        ListingsError::Deserialize { .. }
        | ListingsError::Api(_)
        | ListingsError::InvalidBaseUrl { .. } => false,
    }
}

/// Seconds to wait before retry number `attempt` (1-based), before jitter.
///
/// A rate-limit response's `Retry-After` takes precedence over the
/// exponential schedule. Both are capped at one minute.
fn base_delay_secs(err: &ListingsError, attempt: u32, backoff_base_secs: u64) -> u64 {
    let computed = match err {
        ListingsError::RateLimited { retry_after_secs } => *retry_after_secs,
        _ => backoff_base_secs.saturating_mul(1u64 << (attempt - 1).min(10)),
    };
    computed.min(MAX_DELAY_SECS)
}

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors. With `max_retries = 0` the operation runs exactly once.
///
/// Back-off before retry `n` is `backoff_base_secs * 2^(n-1)` seconds with
/// ±25 % jitter, capped at 60 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ListingsError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ListingsError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let base_ms = base_delay_secs(&err, attempt, backoff_base_secs) * 1_000;
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (base_ms as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient listings API error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn server_error() -> ListingsError {
        ListingsError::UnexpectedStatus {
            status: 503,
            url: "http://listings.test/api/search/byurl".to_owned(),
        }
    }

    #[test]
    fn classifies_errors() {
        assert!(is_retriable(&ListingsError::RateLimited {
            retry_after_secs: 1
        }));
        assert!(is_retriable(&server_error()));
        assert!(!is_retriable(&ListingsError::UnexpectedStatus {
            status: 403,
            url: String::new(),
        }));
        assert!(!is_retriable(&ListingsError::Api("not subscribed".to_owned())));
        let src = serde_json::from_str::<()>("invalid").unwrap_err();
        assert!(!is_retriable(&ListingsError::Deserialize {
            context: "test".to_owned(),
            source: src,
        }));
    }

    #[test]
    fn delay_doubles_and_caps() {
        let err = server_error();
        assert_eq!(base_delay_secs(&err, 1, 2), 2);
        assert_eq!(base_delay_secs(&err, 2, 2), 4);
        assert_eq!(base_delay_secs(&err, 3, 2), 8);
        assert_eq!(base_delay_secs(&err, 8, 2), 60);
    }

    #[test]
    fn delay_honours_retry_after() {
        let err = ListingsError::RateLimited {
            retry_after_secs: 7,
        };
        assert_eq!(base_delay_secs(&err, 1, 2), 7);
        let err = ListingsError::RateLimited {
            retry_after_secs: 600,
        };
        assert_eq!(base_delay_secs(&err, 1, 2), 60);
    }

    #[tokio::test]
    async fn zero_retries_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(0, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(server_error())
            }
        })
        .await;
        assert!(matches!(
            result,
            Err(ListingsError::UnexpectedStatus { status: 503, .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(server_error())
                } else {
                    Ok(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_api_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(ListingsError::Api("quota exhausted".to_owned()))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ListingsError::Api(_))));
    }
}
