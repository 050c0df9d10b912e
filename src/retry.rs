//! Bounded retry helper
//!
//! The bot retries in exactly two places: node-busy RPC errors in the chain
//! layer and route fetches against the DODO API. Both share this helper so
//! the attempt accounting and pacing live in one spot.

use crate::Result;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// A fixed-count, fixed-delay retry policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

/// Run `op` until it succeeds, the retry predicate rejects the error, or the
/// policy's attempt budget is exhausted. The last error is returned as-is;
/// callers map it to their terminal variant (`NodeUnavailable`,
/// `RouteUnavailable`).
pub async fn retry<T, F, Fut, P>(policy: RetryPolicy, should_retry: P, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&crate::Error) -> bool,
{
    debug_assert!(policy.max_attempts > 0);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.max_attempts && should_retry(&err) => {
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %err,
                    "attempt failed, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
