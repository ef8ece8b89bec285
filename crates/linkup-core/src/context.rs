//! Per-call deadline and cancellation.
//!
//! A `CallContext` travels with one logical call. Retry sleeps and the
//! transport both consult it. Cancelling a `CancelToken` wakes any thread
//! blocked in `CallContext::sleep` on that token.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Returned when a wait is cut short by cancellation or the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "call cancelled or deadline exceeded")
    }
}

impl std::error::Error for Cancelled {}

#[derive(Debug, Default)]
struct TokenState {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

/// Shared cancel flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<TokenState>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake every sleeper.
    pub fn cancel(&self) {
        *self.lock() = true;
        self.inner.wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.lock()
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        // A poisoned bool is still a valid flag.
        self.inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until `until` (or forever when `None`). Returns true if woken by cancel.
    fn wait_until(&self, until: Option<Instant>) -> bool {
        let mut cancelled = self.lock();
        loop {
            if *cancelled {
                return true;
            }
            cancelled = match until {
                Some(until) => {
                    let now = Instant::now();
                    if now >= until {
                        return false;
                    }
                    self.inner
                        .wake
                        .wait_timeout(cancelled, until - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self
                    .inner
                    .wake
                    .wait(cancelled)
                    .unwrap_or_else(PoisonError::into_inner),
            };
        }
    }
}

/// Deadline and cancel token for one logical call.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: Option<CancelToken>,
}

impl CallContext {
    /// No deadline, no cancellation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deadline `timeout` from now. Keeps an earlier deadline if one is set.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// Absolute deadline. Keeps an earlier deadline if one is set.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// True once the token fired or the deadline passed.
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_done() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Block the current thread for `delay`.
    ///
    /// Fails immediately if the delay would run past the deadline, and
    /// returns as soon as the cancel token fires.
    pub fn sleep(&self, delay: Duration) -> Result<(), Cancelled> {
        self.check()?;
        let wake = Instant::now().checked_add(delay);
        if let Some(deadline) = self.deadline {
            if wake.map_or(true, |w| w > deadline) {
                return Err(Cancelled);
            }
        }
        match &self.cancel {
            Some(token) => {
                if token.wait_until(wake) {
                    return Err(Cancelled);
                }
            }
            None => std::thread::sleep(delay),
        }
        Ok(())
    }
}
