//! Token bucket admission control.
//!
//! Tokens accrue at `sustained_rate` tokens/second up to `burst_size`, as a
//! fractional amount over a monotonic clock rather than in discrete ticks,
//! so long runs do not accumulate the drift of fixed-interval throttles.
//! The bucket starts full: a fresh run may burst immediately.

use std::time::Duration;

use tokio::time::Instant;

use dumpreplay_core::RatePolicy;

/// Single-owner token bucket.
///
/// The dispatcher owns its bucket exclusively, so state lives behind
/// `&mut self` with no lock. Uses `tokio::time::Instant` so paced waits stay
/// coherent with the runtime clock (including the paused test clock).
pub struct TokenBucket {
    capacity: f64,
    refill_rate: f64,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(policy: &RatePolicy) -> Self {
        Self {
            capacity: f64::from(policy.burst_size),
            refill_rate: policy.sustained_rate,
            tokens: f64::from(policy.burst_size),
            last_refill: Instant::now(),
        }
    }

    /// Try to consume one token.
    ///
    /// Returns `true` if a token was available and consumed, `false` if the
    /// caller should wait [`wait_time`](Self::wait_time) and retry.
    pub fn try_acquire(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Estimated wait until one token is available, given current state.
    ///
    /// Saturates at `Duration::MAX` when the deficit divided by a tiny
    /// refill rate exceeds `Duration`'s range.
    pub fn wait_time(&self) -> Duration {
        let deficit = 1.0 - self.tokens;
        if deficit <= 0.0 {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(deficit / self.refill_rate).unwrap_or(Duration::MAX)
        }
    }

    /// Currently available tokens.
    pub fn available(&mut self) -> f64 {
        self.refill();
        self.tokens
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }
}
