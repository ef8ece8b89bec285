//! Classify HTTP statuses and `Retry-After` values for the attempt loop.

use std::time::Duration;

/// How the executor treats a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx: return the body verbatim.
    Success,
    /// 401: terminal sentinel, never retried.
    Unauthorized,
    /// 403: terminal sentinel, never retried.
    Forbidden,
    /// 429 or 5xx: retry while the budget allows.
    Retryable,
    /// Any other status: terminal, error body decoded.
    Terminal,
}

/// Classify an HTTP status code.
pub fn classify_status(status: u16) -> StatusClass {
    match status {
        200..=299 => StatusClass::Success,
        401 => StatusClass::Unauthorized,
        403 => StatusClass::Forbidden,
        429 | 500..=599 => StatusClass::Retryable,
        _ => StatusClass::Terminal,
    }
}

/// Parse a `Retry-After` header given in delta-seconds.
///
/// Only positive integers count. Zero, HTTP-dates and garbage yield `None`,
/// which makes the caller fall back to computed backoff.
pub fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    let secs: u64 = value?.trim().parse().ok()?;
    (secs > 0).then(|| Duration::from_secs(secs))
}
