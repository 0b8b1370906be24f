//! # Polling configuration.
//!
//! [`PollConfig`] centralizes the knobs of one polling loop: what to read, how
//! often, and how to back off when reads fail.
//!
//! ## Sentinel values
//! - `cycle = 0s` → 1s
//! - `latency = 0s` → 500ms
//! - `timeout = 0s` → no read timeout
//! - `params` empty → [`DEFAULT_PARAMS`]
//! - `backoff_min = None` → the cycle; `backoff_max = None` → 10 × `backoff_min`;
//!   `backoff_multiplier = None` → 1.5
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use cadencevisor::PollConfig;
//!
//! let mut cfg = PollConfig::default();
//! cfg.cycle = Duration::from_millis(250);
//!
//! let backoff = cfg.backoff();
//! assert_eq!(backoff.first, Duration::from_millis(250));
//! assert_eq!(backoff.max, Duration::from_millis(2500));
//! ```

use std::time::Duration;

use crate::core::{DEFAULT_CYCLE, PollRequest};
use crate::gateway::{DEFAULT_PARAMS, Parameter};
use crate::policies::{BackoffPolicy, JitterPolicy};

/// Default bound on how long the loop sleeps before re-checking completion.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

/// Configuration of a polling loop.
///
/// All fields are public; prefer the accessors, which resolve the sentinels.
#[derive(Clone, Debug)]
pub struct PollConfig {
    /// Target cadence (`0s` = 1s).
    pub cycle: Duration,
    /// Parameters read each cycle, in result order (empty = [`DEFAULT_PARAMS`]).
    pub params: Vec<Parameter>,
    /// Forward unrecognized parameters as raw addresses.
    pub pass_thru: bool,
    /// Per-read I/O timeout (`0s` = none).
    pub timeout: Duration,
    /// Delay after the first failure (`None` = the cycle).
    pub backoff_min: Option<Duration>,
    /// Backoff cap (`None` = 10 × `backoff_min`).
    pub backoff_max: Option<Duration>,
    /// Backoff growth per consecutive failure (`None` = 1.5).
    pub backoff_multiplier: Option<f64>,
    /// Backoff randomization.
    pub jitter: JitterPolicy,
    /// Longest single sleep between completion checks (`0s` = 500ms).
    pub latency: Duration,
    /// Event bus ring buffer size (min 1).
    pub bus_capacity: usize,
}

impl Default for PollConfig {
    /// 1s cycle over [`DEFAULT_PARAMS`], default backoff, 500ms latency, no timeout.
    fn default() -> Self {
        Self {
            cycle: DEFAULT_CYCLE,
            params: DEFAULT_PARAMS.to_vec(),
            pass_thru: false,
            timeout: Duration::ZERO,
            backoff_min: None,
            backoff_max: None,
            backoff_multiplier: None,
            jitter: JitterPolicy::None,
            latency: DEFAULT_LATENCY,
            bus_capacity: 1024,
        }
    }
}

impl PollConfig {
    /// Returns a config polling `params` every `cycle`, defaults elsewhere.
    pub fn new(cycle: Duration, params: Vec<Parameter>) -> Self {
        Self {
            cycle,
            params,
            ..Self::default()
        }
    }

    /// The effective cycle.
    #[inline]
    pub fn cycle(&self) -> Duration {
        if self.cycle.is_zero() {
            DEFAULT_CYCLE
        } else {
            self.cycle
        }
    }

    /// The effective completion-check latency.
    #[inline]
    pub fn latency(&self) -> Duration {
        if self.latency.is_zero() {
            DEFAULT_LATENCY
        } else {
            self.latency
        }
    }

    /// The read timeout as an `Option`.
    #[inline]
    pub fn read_timeout(&self) -> Option<Duration> {
        Some(self.timeout).filter(|t| !t.is_zero())
    }

    /// Bus capacity clamped to at least 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Resolves the backoff settings into a policy.
    pub fn backoff(&self) -> BackoffPolicy {
        let first = self.backoff_min.unwrap_or_else(|| self.cycle());
        let mut policy = BackoffPolicy::from_min(first).with_jitter(self.jitter);
        if let Some(max) = self.backoff_max {
            policy = policy.with_max(max);
        }
        if let Some(factor) = self.backoff_multiplier {
            policy = policy.with_factor(factor);
        }
        policy
    }

    /// The per-cycle read request.
    pub fn request(&self) -> PollRequest {
        let params = if self.params.is_empty() {
            DEFAULT_PARAMS.to_vec()
        } else {
            self.params.clone()
        };
        PollRequest {
            params,
            pass_thru: self.pass_thru,
            timeout: self.read_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_resolve() {
        let cfg = PollConfig {
            cycle: Duration::ZERO,
            latency: Duration::ZERO,
            params: Vec::new(),
            bus_capacity: 0,
            ..PollConfig::default()
        };
        assert_eq!(cfg.cycle(), Duration::from_secs(1));
        assert_eq!(cfg.latency(), Duration::from_millis(500));
        assert_eq!(cfg.read_timeout(), None);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.request().params, DEFAULT_PARAMS.to_vec());
    }

    #[test]
    fn test_default_backoff() {
        let policy = PollConfig::default().backoff();
        assert_eq!(policy.first, Duration::from_secs(1));
        assert_eq!(policy.max, Duration::from_secs(10));
        assert_eq!(policy.factor, 1.5);
    }

    #[test]
    fn test_explicit_backoff_overrides() {
        let cfg = PollConfig {
            backoff_min: Some(Duration::from_millis(200)),
            backoff_max: Some(Duration::from_secs(1)),
            backoff_multiplier: Some(3.0),
            ..PollConfig::new(Duration::from_secs(5), vec![Parameter::from("Speed Ref")])
        };
        let policy = cfg.backoff();
        assert_eq!(policy.first, Duration::from_millis(200));
        assert_eq!(policy.max, Duration::from_secs(1));
        assert_eq!(policy.next(None), Duration::from_millis(200));
        assert_eq!(policy.next(Some(Duration::from_millis(200))), Duration::from_millis(600));
        assert_eq!(policy.next(Some(Duration::from_millis(600))), Duration::from_secs(1));
    }

    #[test]
    fn test_request_carries_read_settings() {
        let cfg = PollConfig {
            pass_thru: true,
            timeout: Duration::from_secs(2),
            ..PollConfig::default()
        };
        let req = cfg.request();
        assert!(req.pass_thru);
        assert_eq!(req.timeout, Some(Duration::from_secs(2)));
    }
}
