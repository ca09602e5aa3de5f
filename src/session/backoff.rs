//! Reconnect backoff policy.
//!
//! Retry pacing is a first-class object the session driver consumes, not
//! sleep calls scattered through the loop. The default matches the fixed
//! 5-second cadence of a long-running voice session that is expected to
//! self-heal; an exponential variant is available via config.

use std::time::Duration;

/// How long to wait before the next connection attempt.
#[derive(Debug, Clone)]
pub enum BackoffPolicy {
    /// Constant delay between attempts.
    Fixed { delay: Duration },
    /// Delay doubles per consecutive failure, up to `max`.
    Exponential {
        base: Duration,
        max: Duration,
        attempt: u32,
    },
}

impl BackoffPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self::Fixed { delay }
    }

    pub fn exponential(base: Duration, max: Duration) -> Self {
        Self::Exponential {
            base,
            max,
            attempt: 0,
        }
    }

    /// Delay before the next attempt; advances the failure count.
    pub fn next_delay(&mut self) -> Duration {
        match self {
            Self::Fixed { delay } => *delay,
            Self::Exponential { base, max, attempt } => {
                let exp = (*attempt).min(16);
                *attempt = attempt.saturating_add(1);
                let factor = 1u32 << exp;
                (*base).saturating_mul(factor).min(*max)
            }
        }
    }

    /// Reset after a successful connection.
    pub fn reset(&mut self) {
        if let Self::Exponential { attempt, .. } = self {
            *attempt = 0;
        }
    }
}
