//! Retry loop: run an attempt closure until success, a terminal failure, or
//! the policy says stop.

use super::jitter::JitterSource;
use super::policy::{RetryDecision, RetryPolicy};
use crate::context::CallContext;
use crate::error::LinkupError;
use crate::transport::TransportError;
use std::fmt;
use std::time::Duration;

/// One physical attempt within a logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    /// 0-based attempt index.
    pub index: u32,
    /// Delay slept before this attempt (zero for the first).
    pub delay: Duration,
    max_retries: u32,
}

impl Attempt {
    fn first(policy: &RetryPolicy) -> Self {
        Self {
            index: 0,
            delay: Duration::ZERO,
            max_retries: policy.max_retries(),
        }
    }

    fn next(self, delay: Duration) -> Self {
        Self {
            index: self.index + 1,
            delay,
            ..self
        }
    }

    /// True when no retry may follow this attempt.
    pub fn is_last(&self) -> bool {
        self.index >= self.max_retries
    }
}

/// Why an attempt may be retried.
#[derive(Debug)]
pub enum RetryReason {
    /// No response was received.
    Transport(TransportError),
    /// 429 or 5xx.
    Status(u16),
}

/// A retryable failure plus the server's `Retry-After` hint, if any.
#[derive(Debug)]
pub struct RetryableFailure {
    pub reason: RetryReason,
    pub retry_after: Option<Duration>,
}

impl RetryableFailure {
    pub fn transport(err: TransportError) -> Self {
        Self {
            reason: RetryReason::Transport(err),
            retry_after: None,
        }
    }

    pub fn status(status: u16, retry_after: Option<Duration>) -> Self {
        Self {
            reason: RetryReason::Status(status),
            retry_after,
        }
    }

    fn into_error(self) -> LinkupError {
        match self.reason {
            RetryReason::Transport(e) => LinkupError::Transport(e),
            RetryReason::Status(status) => LinkupError::Http { status },
        }
    }
}

impl fmt::Display for RetryableFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            RetryReason::Transport(e) => write!(f, "{}", e),
            RetryReason::Status(status) => write!(f, "HTTP {}", status),
        }
    }
}

/// Classified result of one attempt. Exactly one is produced per attempt.
#[derive(Debug)]
pub enum Outcome<T> {
    Success(T),
    Retryable(RetryableFailure),
    Terminal(LinkupError),
}

/// Runs `f` until it yields `Success` or `Terminal`, or the policy's retry
/// budget is spent. Between attempts the calling thread sleeps for the
/// server hint or the jittered backoff; the sleep is cut short (with
/// `LinkupError::Cancelled`) by the call context.
///
/// Attempt closures should resolve their own last attempt to `Terminal`; a
/// `Retryable` on the last attempt is surfaced as the bare transport or
/// HTTP error.
pub fn run_with_retry<T, F>(
    policy: &RetryPolicy,
    jitter: &dyn JitterSource,
    ctx: &CallContext,
    mut f: F,
) -> Result<T, LinkupError>
where
    F: FnMut(&Attempt) -> Outcome<T>,
{
    let mut attempt = Attempt::first(policy);
    loop {
        ctx.check()?;
        match f(&attempt) {
            Outcome::Success(value) => return Ok(value),
            Outcome::Terminal(err) => return Err(err),
            Outcome::Retryable(failure) => {
                match policy.decide(attempt.index, failure.retry_after, jitter) {
                    RetryDecision::NoRetry => return Err(failure.into_error()),
                    RetryDecision::RetryAfter(delay) => {
                        tracing::warn!(
                            "attempt {}/{} failed ({}); retrying in {:?}",
                            attempt.index + 1,
                            policy.max_attempts(),
                            failure,
                            delay
                        );
                        ctx.sleep(delay)?;
                        attempt = attempt.next(delay);
                    }
                }
            }
        }
    }
}
