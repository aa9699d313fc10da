//! Backoff policy for remote rule engine calls.
//!
//! Only transient transport errors (connection failures, timeouts) are
//! retried. Non-2xx responses and deserialization failures are the caller's
//! problem and are never retried.

use std::time::Duration;

/// Retry attempts after the initial request, when not configured.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// First-retry delay, when not configured. Doubles on each further retry.
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);

/// Exponential-backoff policy for one remote engine.
///
/// The gateway builds one per configured remote, so retry behavior follows
/// the deployment's engine configuration rather than a compile-time
/// constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retry attempts after the initial request.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent one.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Policy with `max_retries` attempts and the stock backoff schedule.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Delay before retry `attempt` (0-based): `base_delay * 2^attempt`,
    /// saturating rather than wrapping on absurd attempt counts.
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }

    /// Send an HTTP request, retrying transport failures per this policy.
    ///
    /// The closure is called up to `max_retries + 1` times. The response
    /// status code is not inspected here; a served error page is still a
    /// served response.
    pub(crate) async fn send<F, Fut>(&self, f: F) -> Result<reqwest::Response, reqwest::Error>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        for attempt in 0..self.max_retries {
            match f().await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        "rule engine request failed, retrying in {delay:?}: {e}"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
        // Final attempt, no more retries.
        f().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn failing_request(
    ) -> impl std::future::Future<Output = Result<reqwest::Response, reqwest::Error>> {
        // Request to a guaranteed-closed port: connection refused.
        async {
            reqwest::Client::builder()
                .timeout(Duration::from_millis(50))
                .build()
                .unwrap()
                .get("http://127.0.0.1:1/")
                .send()
                .await
        }
    }

    #[test]
    fn backoff_doubles_from_the_base_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_millis(200));
        assert_eq!(policy.backoff(1), Duration::from_millis(400));
        assert_eq!(policy.backoff(2), Duration::from_millis(800));

        let quick = RetryPolicy {
            max_retries: 5,
            base_delay: Duration::from_millis(10),
        };
        assert_eq!(quick.backoff(3), Duration::from_millis(80));
    }

    #[tokio::test]
    async fn zero_retry_policy_sends_exactly_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = RetryPolicy::new(0)
            .send(|| {
                counter.fetch_add(1, Ordering::SeqCst);
                failing_request()
            })
            .await;

        assert!(result.is_err(), "request to closed port must fail");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_policy_makes_initial_call_plus_each_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let policy = RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_millis(1),
        };

        let result = policy
            .send(|| {
                counter.fetch_add(1, Ordering::SeqCst);
                failing_request()
            })
            .await;

        assert!(result.is_err(), "request to closed port must fail");
        assert_eq!(calls.load(Ordering::SeqCst), policy.max_retries + 1);
    }
}
