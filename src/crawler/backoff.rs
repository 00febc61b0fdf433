use std::time::Duration;

/// Linear retry schedule for whole-page retries
///
/// Retry `n` (1-based) waits `base × n`, so with a 2s base the waits are
/// 2s, 4s, 6s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearBackoff {
    base: Duration,
    max_retries: u32,
}

impl LinearBackoff {
    pub const fn new(base: Duration, max_retries: u32) -> Self {
        Self { base, max_retries }
    }

    /// Retries allowed after the first attempt
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total attempts including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry`, or `None` once retries are exhausted
    pub fn delay(&self, retry: u32) -> Option<Duration> {
        if retry == 0 || retry > self.max_retries {
            return None;
        }
        Some(self.base.saturating_mul(retry))
    }
}
