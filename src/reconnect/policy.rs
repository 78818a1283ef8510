//! Exponential backoff with an attempt ceiling.
//!
//! Delay for attempt `n` (1-indexed) is `base * 2^(n-1)`. The counter is
//! incremented before the delay is computed, so the first retry waits
//! `base`, the second `base * 2`, and so on until the ceiling.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Default number of automatic retries.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Growth factor between consecutive delays.
pub const BACKOFF_MULTIPLIER: u32 = 2;

// ============================================================================
// ReconnectPolicy
// ============================================================================

/// Retry counter and delay schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    base_delay: Duration,
    max_attempts: u32,
    attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS)
    }
}

impl ReconnectPolicy {
    /// Creates a policy with a zeroed counter.
    #[inline]
    #[must_use]
    pub const fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts,
            attempts: 0,
        }
    }

    /// Returns the delay before the first retry.
    #[inline]
    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Returns the attempt ceiling.
    #[inline]
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the number of retries scheduled since the last reset.
    #[inline]
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns `true` while another retry may be scheduled.
    #[inline]
    #[must_use]
    pub const fn can_retry(&self) -> bool {
        self.attempts < self.max_attempts
    }

    /// Delay for a given 1-indexed attempt.
    ///
    /// Saturates at [`Duration::MAX`] instead of overflowing.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        BACKOFF_MULTIPLIER
            .checked_pow(exponent)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }

    /// Consumes one attempt and returns `(attempt, delay)` for it.
    ///
    /// Returns `None` once the ceiling has been reached.
    pub fn next_attempt(&mut self) -> Option<(u32, Duration)> {
        if !self.can_retry() {
            return None;
        }
        self.attempts += 1;
        Some((self.attempts, self.delay_for(self.attempts)))
    }

    /// Resets the counter after a successful open.
    #[inline]
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Pins the counter at the ceiling so nothing further is scheduled.
    #[inline]
    pub fn exhaust(&mut self) {
        self.attempts = self.max_attempts;
    }
}

// ============================================================================
// Tests
// ============================================================================
