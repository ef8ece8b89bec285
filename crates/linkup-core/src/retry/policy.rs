use super::jitter::JitterSource;
use crate::error::LinkupError;
use std::time::Duration;

/// Lower bound of the jitter factor applied to a backoff delay.
pub const JITTER_MIN: f64 = 0.8;
/// Upper bound of the jitter factor applied to a backoff delay.
pub const JITTER_MAX: f64 = 1.2;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry; the current failure is terminal.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff with jitter and a retry budget.
///
/// Immutable once built; `new` rejects a maximum delay below the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    min_backoff: Duration,
    max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(4),
        }
    }
}

impl RetryPolicy {
    pub fn new(
        max_retries: u32,
        min_backoff: Duration,
        max_backoff: Duration,
    ) -> Result<Self, LinkupError> {
        if max_backoff < min_backoff {
            return Err(LinkupError::Config(format!(
                "max backoff {:?} is below min backoff {:?}",
                max_backoff, min_backoff
            )));
        }
        Ok(Self {
            max_retries,
            min_backoff,
            max_backoff,
        })
    }

    /// Policy that never retries.
    pub fn no_retries() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total physical attempts per logical call (first try included).
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn min_backoff(&self) -> Duration {
        self.min_backoff
    }

    pub fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    /// Un-jittered delay for retry `attempt` (0-based): `min * 2^attempt`, capped.
    pub fn base_delay(&self, attempt: u32) -> Duration {
        1u32.checked_shl(attempt)
            .and_then(|factor| self.min_backoff.checked_mul(factor))
            .map_or(self.max_backoff, |d| d.min(self.max_backoff))
    }

    /// Jittered delay for retry `attempt`: `base_delay * f`, `f` in `[0.8, 1.2]`.
    pub fn backoff(&self, attempt: u32, jitter: &dyn JitterSource) -> Duration {
        let base = self.base_delay(attempt);
        let sample = jitter.sample();
        let sample = if sample.is_finite() { sample } else { 0.5 };
        let factor = (JITTER_MIN + (JITTER_MAX - JITTER_MIN) * sample).clamp(JITTER_MIN, JITTER_MAX);
        Duration::try_from_secs_f64(base.as_secs_f64() * factor).unwrap_or(base)
    }

    /// Decide whether retry `attempt` (0-based index of the attempt that just
    /// failed) may be followed by another one. A server-provided
    /// `retry_after` replaces the computed backoff.
    pub fn decide(
        &self,
        attempt: u32,
        retry_after: Option<Duration>,
        jitter: &dyn JitterSource,
    ) -> RetryDecision {
        if attempt >= self.max_retries {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(retry_after.unwrap_or_else(|| self.backoff(attempt, jitter)))
    }
}
