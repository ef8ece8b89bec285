//! Retry and backoff policy.
//!
//! This module owns status classification (what is retryable, what is a
//! sentinel failure), exponential backoff with jitter, and the attempt loop
//! itself, so the executor only has to turn one HTTP exchange into an
//! `Outcome`.

mod classify;
mod jitter;
mod policy;
mod run;

pub use classify::{classify_status, parse_retry_after, StatusClass};
pub use jitter::{FixedJitter, JitterSource, ThreadRngJitter};
pub use policy::{RetryDecision, RetryPolicy};
pub use run::{run_with_retry, Attempt, Outcome, RetryReason, RetryableFailure};
