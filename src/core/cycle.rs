//! # Cycle manager: one poll at a steady cadence.
//!
//! [`run_cycle`] wraps one [`execute`](crate::core::executor::execute) with cadence
//! bookkeeping. It works out where "now" falls relative to the reference start of
//! the last cycle, advances that reference by whole cycles, reads, and reports how
//! long to wait before the next cycle is due.
//!
//! ```text
//!   last_poll                     now
//!      │◄────────── elapsed ────────►│
//!      ├──cycle──┼──cycle──┼──cycle──┼─┤
//!      └─────── missed × cycle ──────┘
//!                       new last_poll ┘   delay = last_poll + cycle − finished
//! ```
//!
//! ## Cadence
//! - no reference yet      → [`Cadence::First`], reference = now
//! - `elapsed < cycle`     → [`Cadence::Premature`], reference unchanged
//! - `elapsed / cycle == 1`→ [`Cadence::OnTime`], reference += cycle
//! - `elapsed / cycle > 1` → [`Cadence::Missed`], reference += cycles × cycle (logged)
//!
//! A single missed boundary is indistinguishable from an on-time poll and is not logged.
//!
//! The reference only ever moves by whole cycles, so drift in when the caller
//! happens to wake up never accumulates.
//!
//! ## Failure
//! The gateway is guarded for the duration of the read. Any error (or the cycle
//! future being dropped mid-read) closes it before the error reaches the caller,
//! so the next attempt starts on a fresh session.

use std::time::Duration;

use futures::TryStreamExt;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::core::executor::{PollRequest, execute};
use crate::error::PollError;
use crate::gateway::{Gateway, Parameter};

/// Cycle used when none (or zero) is configured.
pub const DEFAULT_CYCLE: Duration = Duration::from_secs(1);

/// Where a cycle started relative to the cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cadence {
    /// First cycle; the reference was initialized to the start time.
    First,
    /// Called before the current cycle elapsed (out-of-band refresh).
    Premature {
        /// Time since the reference start.
        elapsed: Duration,
    },
    /// Exactly one cycle boundary passed.
    OnTime,
    /// More than one cycle boundary passed; the skipped ones are lost.
    ///
    /// Logged at `warn`, the level of a first poll failure; `info` is kept for
    /// premature polls.
    Missed {
        /// Number of whole cycles the reference advanced by.
        cycles: u64,
        /// Time since the previous reference start.
        elapsed: Duration,
    },
}

/// Outcome of one successful cycle.
#[derive(Clone, Debug)]
pub struct Cycle<V> {
    /// Reference start of the cycle this poll belongs to.
    pub last_poll: Instant,
    /// Time until the next cycle is due (never negative).
    pub delay: Duration,
    /// Values read, in request order.
    pub results: Vec<(Parameter, V)>,
    /// How the call related to the cadence.
    pub cadence: Cadence,
    /// When the read began.
    pub started: Instant,
    /// When the read finished.
    pub finished: Instant,
}

impl<V> Cycle<V> {
    /// Time spent reading.
    pub fn duration(&self) -> Duration {
        self.finished.saturating_duration_since(self.started)
    }

    /// Polls per second this read would sustain; infinite for a zero-length read.
    pub fn throughput(&self) -> f64 {
        let secs = self.duration().as_secs_f64();
        if secs == 0.0 { f64::INFINITY } else { 1.0 / secs }
    }
}

/// Advances the reference start for a call at `now`.
///
/// Pure cadence arithmetic used by [`run_cycle`]. `cycle` must be non-zero.
pub fn advance(last_poll: Option<Instant>, now: Instant, cycle: Duration) -> (Instant, Cadence) {
    let Some(last) = last_poll else {
        return (now, Cadence::First);
    };
    let elapsed = now.saturating_duration_since(last);
    if elapsed < cycle {
        return (last, Cadence::Premature { elapsed });
    }

    let cycle_ns = cycle.as_nanos();
    let cycles = elapsed.as_nanos() / cycle_ns;
    // remainder < cycle, so it always fits
    let step = elapsed - Duration::from_nanos((elapsed.as_nanos() % cycle_ns) as u64);
    let cadence = if cycles > 1 {
        Cadence::Missed {
            cycles: cycles.min(u128::from(u64::MAX)) as u64,
            elapsed,
        }
    } else {
        Cadence::OnTime
    };
    (last + step, cadence)
}

/// Closes the gateway on drop unless disarmed.
struct CloseOnError<'a, G: Gateway + ?Sized> {
    gateway: &'a G,
    armed: bool,
}

impl<'a, G: Gateway + ?Sized> CloseOnError<'a, G> {
    fn new(gateway: &'a G) -> Self {
        Self {
            gateway,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<G: Gateway + ?Sized> Drop for CloseOnError<'_, G> {
    fn drop(&mut self) {
        if self.armed {
            debug!("closing gateway after failed poll");
            self.gateway.close();
        }
    }
}

/// Executes the request and materializes every pair.
async fn read_all<G>(
    gateway: &G,
    request: &PollRequest,
) -> Result<Vec<(Parameter, G::Value)>, PollError>
where
    G: Gateway + ?Sized,
{
    execute(gateway, &request.params, request.pass_thru)?
        .try_collect()
        .await
}

/// Runs one poll cycle.
///
/// `last_poll` is the reference start returned by the previous successful cycle
/// (`None` before the first). A zero `cycle` means [`DEFAULT_CYCLE`].
///
/// On success returns the advanced reference, the delay until the next cycle and the
/// fully materialized results. On failure the gateway has already been closed.
pub async fn run_cycle<G>(
    gateway: &G,
    last_poll: Option<Instant>,
    cycle: Duration,
    request: &PollRequest,
) -> Result<Cycle<G::Value>, PollError>
where
    G: Gateway + ?Sized,
{
    let cycle = if cycle.is_zero() { DEFAULT_CYCLE } else { cycle };
    let started = Instant::now();
    let (last_poll, cadence) = advance(last_poll, started, cycle);

    match cadence {
        Cadence::Premature { elapsed } => info!(
            "premature poll at {:7.3}s into {:7.3}s poll cycle",
            elapsed.as_secs_f64(),
            cycle.as_secs_f64()
        ),
        Cadence::Missed { cycles, elapsed } => warn!(
            missed = cycles,
            "missed {cycles:3} polls, {:7.3}s past {:7.3}s poll cycle",
            elapsed.saturating_sub(cycle).as_secs_f64(),
            cycle.as_secs_f64()
        ),
        Cadence::First | Cadence::OnTime => {}
    }
    debug!(
        "polling started   {:7.3}s into {:7.3}s poll cycle",
        started.saturating_duration_since(last_poll).as_secs_f64(),
        cycle.as_secs_f64()
    );

    let guard = CloseOnError::new(gateway);
    let read = read_all(gateway, request);
    let results = match request.timeout {
        Some(timeout) => time::timeout(timeout, read)
            .await
            .map_err(|_elapsed| PollError::Timeout { timeout })?,
        None => read.await,
    }?;
    guard.disarm();

    let finished = Instant::now();
    let delay = (last_poll + cycle).saturating_duration_since(finished);
    let done = Cycle {
        last_poll,
        delay,
        results,
        cadence,
        started,
        finished,
    };
    debug!(
        "polling finished  {:7.3}s into {:7.3}s poll cycle, taking {:7.3}s ({:5.1} TPS)",
        finished.saturating_duration_since(last_poll).as_secs_f64(),
        cycle.as_secs_f64(),
        done.duration().as_secs_f64(),
        done.throughput()
    );
    Ok(done)
}
