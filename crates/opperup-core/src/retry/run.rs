//! Retry loop: run a closure until success, a final error, or cancellation.

use std::time::{Duration, Instant};

use super::classify;
use super::policy::{RetryDecision, RetryPolicy};
use crate::cancel::CancelToken;
use crate::error::{ReleaseError, ReleaseResult};

/// Granularity at which backoff sleeps notice cancellation.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Runs `f` until it succeeds or the policy says stop. Backoff sleeps are
/// interrupted by `cancel`, which turns into `ReleaseError::Cancelled`.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, cancel: &CancelToken, mut f: F) -> ReleaseResult<T>
where
    F: FnMut(u32) -> ReleaseResult<T>,
{
    let mut attempt = 1u32;
    loop {
        cancel.check()?;
        match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        tracing::warn!(attempt, delay_ms = d.as_millis() as u64, error = %e, "retrying");
                        sleep_unless_cancelled(d, cancel)?;
                        attempt += 1;
                    }
                }
            }
        }
    }
}

fn sleep_unless_cancelled(total: Duration, cancel: &CancelToken) -> Result<(), ReleaseError> {
    let deadline = Instant::now() + total;
    loop {
        cancel.check()?;
        let now = Instant::now();
        if now >= deadline {
            return Ok(());
        }
        std::thread::sleep((deadline - now).min(SLEEP_SLICE));
    }
}
