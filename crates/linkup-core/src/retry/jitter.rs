//! Randomness used to spread retries across clients.

use rand::Rng;

/// Source of uniform samples in `[0, 1)`.
///
/// Out-of-range or non-finite samples are tolerated; the policy clamps the
/// resulting jitter factor.
pub trait JitterSource: Send + Sync {
    fn sample(&self) -> f64;
}

/// Thread-local `rand` generator, seeded from the OS once per thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngJitter;

impl JitterSource for ThreadRngJitter {
    fn sample(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Always returns the same sample. Makes backoff deterministic.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn sample(&self) -> f64 {
        self.0
    }
}
