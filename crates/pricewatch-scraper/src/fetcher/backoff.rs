//! Pure backoff schedule.

use std::time::Duration;

/// Jitter factors are drawn from `[JITTER_MIN, JITTER_MAX)`.
pub const JITTER_MIN: f64 = 0.5;
pub const JITTER_MAX: f64 = 1.5;

/// Exponential backoff: the wait before retry `n` (0-based) is
/// `base * 2^n * jitter`.
///
/// | retry index | delay with `base = 2s`, jitter 1.0 |
/// |-------------|------------------------------------|
/// | 0           | 2 s                                |
/// | 1           | 4 s                                |
/// | 2           | 8 s                                |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
}

impl BackoffPolicy {
    #[must_use]
    pub const fn new(base: Duration) -> Self {
        Self { base }
    }

    /// Delay before the retry with the given index. `jitter` is clamped to
    /// the `[JITTER_MIN, JITTER_MAX]` range.
    #[must_use]
    pub fn delay_for(&self, retry_index: u32, jitter: f64) -> Duration {
        let factor = 1u32 << retry_index.min(16);
        let jitter = if jitter.is_finite() {
            jitter.clamp(JITTER_MIN, JITTER_MAX)
        } else {
            1.0
        };
        self.base.saturating_mul(factor).mul_f64(jitter)
    }

    /// Draws a jitter factor uniformly from `[JITTER_MIN, JITTER_MAX)`.
    #[must_use]
    pub fn sample_jitter() -> f64 {
        JITTER_MIN + rand::random::<f64>() * (JITTER_MAX - JITTER_MIN)
    }
}
