use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Retry decision returned by the error classifier callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    Retry,
    Abort,
}

/// Fixed-delay backoff used when the API answers with a rate limit.
///
/// The delay never grows. `max_retries: None` retries forever.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    pub delay: Duration,
    pub max_retries: Option<u32>,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            max_retries: None,
        }
    }
}

impl BackoffPolicy {
    fn exhausted(&self, retries_so_far: u32) -> bool {
        self.max_retries.is_some_and(|max| retries_so_far >= max)
    }
}

/// Retry an async operation with a fixed delay between attempts.
///
/// - `policy`: delay and optional retry cap
/// - `shutdown`: cancelling it ends a pending backoff wait
/// - `classifier`: inspects an error and returns `Retry` or `Abort`
/// - `operation`: the async closure to retry; it is re-invoked unchanged
///
/// Returns the first `Ok` result, the first error the classifier aborts on,
/// or the last retryable error once the cap is reached or shutdown is
/// requested during a wait.
pub async fn retry_fixed<F, Fut, T, E, C>(
    policy: &BackoffPolicy,
    shutdown: &CancellationToken,
    classifier: C,
    operation: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> RetryAction,
    E: std::fmt::Display,
{
    let mut retries = 0u32;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(e) => {
                if classifier(&e) == RetryAction::Abort || policy.exhausted(retries) {
                    return Err(e);
                }
                retries = retries.saturating_add(1);
                tracing::warn!(
                    "Retryable error (retry {}), retrying in {:?}: {}",
                    retries,
                    policy.delay,
                    e
                );
                tokio::select! {
                    _ = tokio::time::sleep(policy.delay) => {}
                    _ = shutdown.cancelled() => {
                        tracing::info!("Shutdown during backoff, giving up on retry");
                        return Err(e);
                    }
                }
            }
        }
    }
}
