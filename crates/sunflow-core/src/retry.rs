// ── Bounded retry with fixed backoff ──
//
// Mode-agnostic wrapper around one fetch cycle. Every error is
// retryable up to the attempt budget -- the controller never inspects
// error variants to decide eligibility. Exactly one terminal error
// surfaces per exhausted cycle, wrapping the last underlying failure.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::CoreError;

/// Attempt budget and backoff delay for one fetch cycle.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (minimum 1).
    pub max_attempts: u32,
    /// Fixed (non-exponential) delay between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// A policy that tries exactly once.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

/// Run `operation`, retrying per `policy`.
///
/// The backoff sleep suspends only this task. Success is returned
/// immediately; exhaustion yields [`CoreError::UpdateFailed`] wrapping
/// the last recorded error.
pub async fn run_with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, CoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        debug!(attempt, max_attempts, "starting fetch attempt");
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!(attempt, max_attempts, error = %err, "fetch attempt failed");
                last_error = Some(err);
                if attempt < max_attempts {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    Err(CoreError::UpdateFailed {
        attempts: max_attempts,
        source: Box::new(last_error.expect("at least one attempt ran")),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use super::{RetryPolicy, run_with_retry};
    use crate::error::CoreError;

    type OpFuture = std::pin::Pin<Box<dyn Future<Output = Result<u32, CoreError>> + Send>>;

    fn counting_op(calls: Arc<AtomicU32>, succeed_on: u32) -> impl FnMut() -> OpFuture {
        move || {
            let calls = Arc::clone(&calls);
            Box::pin(async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n >= succeed_on {
                    Ok(n)
                } else {
                    Err(CoreError::Internal(format!("boom {n}")))
                }
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn success_on_first_attempt_does_not_sleep() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::from_secs(5));

        let start = tokio::time::Instant::now();
        let result = run_with_retry(&policy, counting_op(Arc::clone(&calls), 1)).await;

        assert_eq!(result.expect("succeeds"), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn two_failures_then_success_performs_two_delayed_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::from_secs(5));

        let start = tokio::time::Instant::now();
        let result = run_with_retry(&policy, counting_op(Arc::clone(&calls), 3)).await;

        assert_eq!(result.expect("succeeds on third attempt"), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two backoff sleeps, none after the success.
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_surfaces_one_terminal_error_wrapping_the_last() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::from_secs(5));

        let start = tokio::time::Instant::now();
        let err = run_with_retry(&policy, counting_op(Arc::clone(&calls), u32::MAX))
            .await
            .expect_err("all attempts fail");

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // Two delays: between 1→2 and 2→3, none after the final failure.
        assert_eq!(start.elapsed(), Duration::from_secs(10));

        match err {
            CoreError::UpdateFailed { attempts, source } => {
                assert_eq!(attempts, 3);
                assert_eq!(source.to_string(), "Internal error: boom 3");
            }
            other => panic!("expected UpdateFailed, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn zero_attempt_budget_is_clamped_to_one() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(0, Duration::ZERO);

        let err = run_with_retry(&policy, counting_op(Arc::clone(&calls), u32::MAX))
            .await
            .expect_err("fails");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err, CoreError::UpdateFailed { attempts: 1, .. }));
    }
}
