//! Loop bookkeeping threaded through the supervisor.

use std::time::Duration;

use tokio::time::Instant;

/// Mutable scheduling state of one polling loop.
///
/// Starts with no reference and a zero delay, so the first cycle runs at once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleState {
    /// Reference start of the last successful cycle.
    pub last_poll: Option<Instant>,
    /// Time to wait before the next cycle, measured from the end of the previous one.
    pub delay: Duration,
    /// Backoff base of the last failure, before jitter; `None` after a success.
    pub backoff: Option<Duration>,
    /// Consecutive failed cycles.
    pub failures: u32,
}

impl CycleState {
    /// Whether the previous cycle failed.
    pub fn backing_off(&self) -> bool {
        self.backoff.is_some()
    }
}

/// Summary of a finished polling loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollStats {
    /// Cycles that read every parameter.
    pub cycles: u64,
    /// Cycles that failed.
    pub failures: u64,
    /// Successful cycles that started before their period elapsed.
    pub premature: u64,
    /// Sum of the missed-poll counts reported by late cycles.
    pub missed: u64,
    /// State at exit.
    pub state: CycleState,
}

impl PollStats {
    /// Cycles attempted.
    pub fn attempts(&self) -> u64 {
        self.cycles + self.failures
    }
}
