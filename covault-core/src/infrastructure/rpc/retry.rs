use crate::foundation::CovaultError;
use log::debug;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry an async operation with exponential backoff.
///
/// Only transient failures are retried; validation/config errors abort
/// immediately since repeating them cannot change the outcome. Used around
/// upstream reads, never around relay submission (submission has no dedup
/// key, so a blind resend could double-spend).
pub async fn retry_with_backoff<F, Fut, T>(
    attempts: usize,
    base_delay: Duration,
    label: &str,
    mut op: F,
) -> Result<T, CovaultError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CovaultError>>,
{
    let attempts = attempts.max(1);
    let mut delay = base_delay;
    let mut last_err = None;
    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_transient() => return Err(err),
            Err(err) => {
                debug!("retryable failure op={} attempt={}/{} error={}", label, attempt, attempts, err);
                last_err = Some(err);
                if attempt < attempts {
                    sleep(delay).await;
                    delay = delay.saturating_mul(2);
                }
            }
        }
    }
    Err(last_err.unwrap_or_else(|| CovaultError::Message(format!("{label}: retry exhausted"))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicUsize::new(0);
        let result = retry_with_backoff(3, Duration::from_millis(1), "test", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(CovaultError::upstream("test", "blip"))
            } else {
                Ok(7u32)
            }
        })
        .await;
        assert_eq!(result.expect("value"), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn terminal_errors_are_not_retried() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = retry_with_backoff(5, Duration::from_millis(1), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(CovaultError::InvalidRequest("bad input".to_string()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhaustion_returns_last_error() {
        let result: Result<(), _> = retry_with_backoff(2, Duration::from_millis(1), "test", || async {
            Err(CovaultError::upstream("endpoint", "still down"))
        })
        .await;
        let err = result.expect_err("exhausted");
        assert!(err.to_string().contains("still down"));
    }
}
