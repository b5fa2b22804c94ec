//! Retry-with-backoff wrapper for remote calls
//!
//! Every outbound call to the social or model API goes through
//! [`call_with_retry`], which composes the retry policy, the shared
//! [`CircuitBreaker`], and [`BotMetrics`] bookkeeping around a plain async
//! closure. The wrapper holds no state of its own; explicit composition at
//! each call site replaces any decorator machinery.

use crate::{BotMetrics, CircuitBreaker};
use magpie_core::{ApiError, RetryConfig};
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

/// Policy parameters for one wrapped call
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts before giving up
    pub max_attempts: u32,
    /// Wait between attempts after a transient failure
    pub retry_delay: Duration,
    /// Wait after a rate-limited failure, independent of `retry_delay`
    pub rate_limit_delay: Duration,
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            retry_delay: config.delay(),
            rate_limit_delay: config.rate_limit_delay(),
        }
    }
}

/// Outcome of a wrapped call
///
/// `Skipped` (circuit open, operation never invoked) and `Exhausted` (all
/// attempts failed) both leave the caller without a value, but they are
/// distinct conditions: a skip is the breaker doing its job, not a fresh
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome<T> {
    /// The operation succeeded within the attempt budget
    Completed(T),
    /// The circuit breaker was open; the operation was never invoked
    Skipped,
    /// Every attempt failed with a retryable error
    Exhausted,
}

impl<T> CallOutcome<T> {
    /// The completed value, if any
    pub fn into_option(self) -> Option<T> {
        match self {
            CallOutcome::Completed(value) => Some(value),
            CallOutcome::Skipped | CallOutcome::Exhausted => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, CallOutcome::Completed(_))
    }
}

/// Run a fallible operation under the retry policy
///
/// Behavior per attempt:
/// - success: record breaker success, return immediately
/// - rate-limited failure: record rate-limit and retry metrics, wait the
///   dedicated rate-limit delay (or the server's `retry-after` hint), and
///   consume one attempt slot
/// - other retryable failure: record a retry metric; wait `retry_delay` if
///   attempts remain, otherwise record a breaker failure and stop
/// - non-retryable failure: propagate as `Err` at once, untried attempts
///   notwithstanding
///
/// Retryable failures never escape as errors; exhausting the budget yields
/// [`CallOutcome::Exhausted`].
pub async fn call_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    metrics: Option<&BotMetrics>,
    breaker: Option<&CircuitBreaker>,
    op: F,
) -> Result<CallOutcome<T>, ApiError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    if let Some(cb) = breaker {
        if !cb.can_execute() {
            warn!(
                "Circuit breaker open, skipping call ({}ms until retry)",
                cb.time_until_retry()
            );
            return Ok(CallOutcome::Skipped);
        }
    }

    for attempt in 1..=policy.max_attempts {
        match op().await {
            Ok(value) => {
                if let Some(cb) = breaker {
                    cb.record_success();
                }
                return Ok(CallOutcome::Completed(value));
            }

            Err(ApiError::RateLimited { retry_after }) => {
                let wait = retry_after
                    .map(Duration::from_secs)
                    .unwrap_or(policy.rate_limit_delay);

                warn!("Rate limited, waiting {}s...", wait.as_secs());
                if let Some(m) = metrics {
                    m.record_rate_limit();
                    m.record_retry();
                }
                tokio::time::sleep(wait).await;
            }

            Err(err) if err.is_retryable() => {
                if let Some(m) = metrics {
                    m.record_retry();
                }

                if attempt < policy.max_attempts {
                    warn!(
                        "Attempt {} failed: {}. Retrying in {}s...",
                        attempt,
                        err,
                        policy.retry_delay.as_secs()
                    );
                    tokio::time::sleep(policy.retry_delay).await;
                } else {
                    error!("All {} attempts failed: {}", policy.max_attempts, err);
                    if let Some(cb) = breaker {
                        cb.record_failure();
                    }
                }
            }

            Err(err) => return Err(err),
        }
    }

    Ok(CallOutcome::Exhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            retry_delay: Duration::from_secs(5),
            rate_limit_delay: Duration::from_secs(15),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let policy = fast_policy(3);
        let metrics = BotMetrics::new();

        let outcome = call_with_retry(&policy, Some(&metrics), None, || async {
            Ok::<_, ApiError>(42)
        })
        .await
        .unwrap();

        assert_eq!(outcome, CallOutcome::Completed(42));
        assert_eq!(metrics.snapshot().retries_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_twice_then_succeeds() {
        let policy = fast_policy(3);
        let metrics = BotMetrics::new();
        let breaker = CircuitBreaker::new(5, Duration::from_secs(60));
        let calls = AtomicU32::new(0);

        let outcome = call_with_retry(&policy, Some(&metrics), Some(&breaker), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(ApiError::Transient("503".to_string()))
                } else {
                    Ok("reply")
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(outcome, CallOutcome::Completed("reply"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(metrics.snapshot().retries_count, 2);
        assert_eq!(breaker.failure_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_records_one_breaker_failure() {
        let policy = fast_policy(2);
        let metrics = BotMetrics::new();
        let breaker = CircuitBreaker::new(5, Duration::from_secs(60));

        let outcome = call_with_retry(&policy, Some(&metrics), Some(&breaker), || async {
            Err::<(), _>(ApiError::Transient("connection reset".to_string()))
        })
        .await
        .unwrap();

        assert_eq!(outcome, CallOutcome::Exhausted);
        assert_eq!(metrics.snapshot().retries_count, 2);
        assert_eq!(breaker.failure_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_breaker_skips_without_invoking() {
        let policy = fast_policy(3);
        let breaker = CircuitBreaker::new(1, Duration::from_secs(60));
        breaker.record_failure();
        assert!(!breaker.can_execute());

        let calls = AtomicU32::new(0);
        let outcome = call_with_retry(&policy, None, Some(&breaker), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, ApiError>(()) }
        })
        .await
        .unwrap();

        assert_eq!(outcome, CallOutcome::Skipped);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_propagates_after_one_invocation() {
        let policy = fast_policy(3);
        let calls = AtomicU32::new(0);

        let result = call_with_retry(&policy, None, None, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(ApiError::InvalidInput("empty text".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(ApiError::InvalidInput(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_attempts_do_not_trip_breaker() {
        let policy = fast_policy(3);
        let metrics = BotMetrics::new();
        let breaker = CircuitBreaker::new(5, Duration::from_secs(60));

        let outcome = call_with_retry(&policy, Some(&metrics), Some(&breaker), || async {
            Err::<(), _>(ApiError::RateLimited { retry_after: None })
        })
        .await
        .unwrap();

        // Every attempt was rate-limited: the call yields nothing, but the
        // breaker's failure budget is untouched.
        assert_eq!(outcome, CallOutcome::Exhausted);
        assert_eq!(breaker.failure_count(), 0);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.rate_limits_hit, 3);
        assert_eq!(snapshot.retries_count, 3);
        assert_eq!(snapshot.consecutive_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_honors_server_hint() {
        let policy = fast_policy(2);
        let calls = AtomicU32::new(0);

        let start = tokio::time::Instant::now();
        let outcome = call_with_retry(&policy, None, None, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(ApiError::RateLimited { retry_after: Some(90) })
                } else {
                    Ok(())
                }
            }
        })
        .await
        .unwrap();

        assert!(outcome.is_completed());
        // Paused clock: elapsed time is exactly the slept duration
        assert_eq!(start.elapsed(), Duration::from_secs(90));
    }

    #[test]
    fn test_into_option() {
        assert_eq!(CallOutcome::Completed(7).into_option(), Some(7));
        assert_eq!(CallOutcome::<i32>::Skipped.into_option(), None);
        assert_eq!(CallOutcome::<i32>::Exhausted.into_option(), None);
    }
}
