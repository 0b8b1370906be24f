//! # Backoff policy for failed polls.
//!
//! [`BackoffPolicy`] decides how long the supervisor waits before retrying after
//! consecutive poll failures:
//! - [`BackoffPolicy::first`] the delay after the first failure (`backoff_min`);
//! - [`BackoffPolicy::factor`] the growth per further failure (`backoff_multiplier`);
//! - [`BackoffPolicy::max`] the cap (`backoff_max`).
//!
//! The first failure of a run waits exactly `first`, even when that exceeds `max`.
//! Each further failure multiplies the previous base by `factor` and clamps it to
//! `max`. A successful cycle clears the base. Jitter only shapes the delay that is
//! actually waited; the base it came from is what the next failure grows.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use cadencevisor::BackoffPolicy;
//!
//! let backoff = BackoffPolicy::from_min(Duration::from_secs(1));
//!
//! let mut prev = None;
//! let mut seq = Vec::new();
//! for _ in 0..7 {
//!     let base = backoff.next(prev);
//!     seq.push(base.as_millis());
//!     prev = Some(base);
//! }
//! // 1.5^6 = 11.39.. → capped at 10 × first
//! assert_eq!(seq, [1000, 1500, 2250, 3375, 5062, 7593, 10000]);
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Growth factor applied when none is configured.
pub const DEFAULT_FACTOR: f64 = 1.5;

/// Ratio between the default cap and the first delay.
pub const DEFAULT_MAX_RATIO: u32 = 10;

/// Exponential retry backoff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first failure of a run of failures.
    pub first: Duration,
    /// Cap for every delay after the first.
    pub max: Duration,
    /// Multiplicative growth factor; below 1.0 the delay decays.
    pub factor: f64,
    /// Randomization applied to the waited delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// `first = 1s`, `factor = 1.5`, `max = 10s`, no jitter.
    fn default() -> Self {
        Self::from_min(Duration::from_secs(1))
    }
}

impl BackoffPolicy {
    /// Builds the default policy around `first`: factor 1.5, cap at ten times `first`.
    pub fn from_min(first: Duration) -> Self {
        Self {
            first,
            max: first.saturating_mul(DEFAULT_MAX_RATIO),
            factor: DEFAULT_FACTOR,
            jitter: JitterPolicy::None,
        }
    }

    /// Returns a copy with a different growth factor.
    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    /// Returns a copy with a different cap.
    pub fn with_max(mut self, max: Duration) -> Self {
        self.max = max;
        self
    }

    /// Returns a copy with a different jitter policy.
    pub fn with_jitter(mut self, jitter: JitterPolicy) -> Self {
        self.jitter = jitter;
        self
    }

    /// Base delay after a failure, given the base of the previous failure in the run.
    ///
    /// `None` (first failure) yields `first` unclamped. Otherwise `prev × factor`
    /// clamped to [`BackoffPolicy::max`]; non-finite products clamp to `max` and
    /// negative ones to zero.
    pub fn next(&self, prev: Option<Duration>) -> Duration {
        let Some(prev) = prev else {
            return self.first;
        };
        let secs = prev.as_secs_f64() * self.factor;
        if !secs.is_finite() || secs >= self.max.as_secs_f64() {
            self.max
        } else if secs <= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(secs)
        }
    }

    /// Delay actually waited for `base`, after jitter.
    pub fn jittered(&self, base: Duration) -> Duration {
        match self.jitter {
            JitterPolicy::Decorrelated => {
                self.jitter
                    .apply_decorrelated(self.first.min(self.max), base, self.max)
            }
            _ => self.jitter.apply(base),
        }
    }
}
