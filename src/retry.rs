//! Bounded retry with exponential backoff.
//!
//! One schedule type drives every retrying path in the crate: the
//! catalog client instantiates a single-retry schedule, and callers
//! wrap arbitrary operations in [`TrackedCall`] for the default
//! three-attempt schedule with UI-facing call state.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::error::{ApiError, ClientResult};

/// Retry schedule. Attempts are zero-indexed; the delay inserted after
/// attempt `n` fails is `initial_delay * multiplier^n`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total invocation budget, including the first attempt
    pub max_attempts: u32,
    /// Delay before the first re-attempt
    pub initial_delay: Duration,
    /// Backoff growth factor
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Schedule with exactly one re-attempt after `delay`.
    pub fn single_retry(delay: Duration) -> Self {
        Self {
            max_attempts: 2,
            initial_delay: delay,
            multiplier: 2.0,
        }
    }

    /// Delay inserted after the given zero-indexed attempt fails.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let millis = self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        Duration::from_millis(millis as u64)
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error,
    /// or exhausts the attempt budget. The operation always runs at
    /// least once; the last error is surfaced on exhaustion.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> ClientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::debug!(attempts = attempt + 1, "Request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        return Err(err);
                    }

                    let delay = self.delay_for(attempt - 1);
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retrying failed request"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Snapshot of an in-flight or completed tracked call.
#[derive(Debug, Clone)]
pub struct CallState<T> {
    pub loading: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T> Default for CallState<T> {
    fn default() -> Self {
        Self {
            loading: false,
            data: None,
            error: None,
        }
    }
}

/// Retry wrapper that mirrors loading / result / error state for the
/// duration of a call, the way a UI binding consumes it. The tracked
/// state is a convenience, not a correctness mechanism.
pub struct TrackedCall<T> {
    policy: RetryPolicy,
    state: Arc<RwLock<CallState<T>>>,
}

impl<T> TrackedCall<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            state: Arc::new(RwLock::new(CallState::default())),
        }
    }

    /// Current call state.
    pub fn state(&self) -> CallState<T> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Runs `op` under the retry schedule, mirroring progress into the
    /// tracked state. The result is both stored and returned.
    pub async fn execute<F, Fut>(&self, op: F) -> ClientResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.loading = true;
            state.error = None;
        }

        let result = self.policy.run(op).await;

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.loading = false;
        match &result {
            Ok(value) => state.data = Some(value.clone()),
            Err(err) => state.error = Some(err.clone()),
        }
        drop(state);

        result
    }

    /// Clears loading, result, and error back to their initial values.
    pub fn reset(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = CallState::default();
    }
}

impl<T> Default for TrackedCall<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}
