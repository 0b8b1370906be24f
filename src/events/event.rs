//! # Events emitted by the polling supervisor.
//!
//! [`EventKind`] classifies what happened; [`Event`] carries the optional metadata
//! (delays, counts, error text) that goes with it.
//!
//! ## Ordering
//! Every event gets a process-wide sequence number (`seq`) that only increases.
//! Subscribers run on separate workers; sort by `seq` to restore the original order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use cadencevisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::BackoffScheduled)
//!     .with_delay(Duration::from_millis(1500))
//!     .with_failures(2)
//!     .with_reason("i/o failure: connection reset");
//!
//! assert_eq!(ev.delay_ms, Some(1500));
//! assert_eq!(ev.failures, Some(2));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervisor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A cycle is about to read.
    ///
    /// Sets: `cycle` (1-based count of attempted cycles).
    PollStarting,

    /// A cycle read every parameter.
    ///
    /// Sets: `cycle`, `results`, `duration_ms`, `delay_ms` (time to next cycle).
    PollCompleted,

    /// A cycle ran before the current period elapsed; the reference was kept.
    ///
    /// Sets: `cycle`, `duration_ms` (time into the period).
    PollPremature,

    /// More than one period elapsed since the last cycle.
    ///
    /// Sets: `cycle`, `missed`.
    PollsMissed,

    /// A cycle failed (resolution or I/O).
    ///
    /// Sets: `cycle`, `reason`, `label`.
    PollFailed,

    /// Gateway was closed (after a failure, or when the loop exits).
    GatewayClosed,

    /// Next attempt delayed by backoff.
    ///
    /// Sets: `delay_ms`, `failures` (consecutive, 1-based), `reason`.
    BackoffScheduled,

    /// A successful cycle cleared an active backoff.
    ///
    /// Sets: `failures` (length of the failure run that ended).
    BackoffReset,

    /// The loop observed completion and exited.
    ///
    /// Sets: `cycle` (cycles attempted), `failures` (total failed cycles).
    Stopped,
}

/// Supervisor event with optional metadata.
#[derive(Clone, Debug)]
pub struct Event {
    /// Monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Cycle counter (attempted cycles, 1-based).
    pub cycle: Option<u64>,
    /// Delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Read duration or offset in milliseconds (compact).
    pub duration_ms: Option<u32>,
    /// Number of results read.
    pub results: Option<u32>,
    /// Number of whole periods skipped over.
    pub missed: Option<u64>,
    /// Consecutive (or total, for `Stopped`) failures.
    pub failures: Option<u32>,
    /// Human-readable reason (error text).
    pub reason: Option<Arc<str>>,
    /// Stable error label, see [`PollError::as_label`](crate::PollError::as_label).
    pub label: Option<&'static str>,
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}

impl Event {
    /// Creates an event of the given kind, stamped now with the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            cycle: None,
            delay_ms: None,
            duration_ms: None,
            results: None,
            missed: None,
            failures: None,
            reason: None,
            label: None,
        }
    }

    #[inline]
    pub fn with_cycle(mut self, n: u64) -> Self {
        self.cycle = Some(n);
        self
    }

    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(compact_ms(d));
        self
    }

    #[inline]
    pub fn with_duration(mut self, d: Duration) -> Self {
        self.duration_ms = Some(compact_ms(d));
        self
    }

    #[inline]
    pub fn with_results(mut self, n: usize) -> Self {
        self.results = Some(n.min(u32::MAX as usize) as u32);
        self
    }

    #[inline]
    pub fn with_missed(mut self, n: u64) -> Self {
        self.missed = Some(n);
        self
    }

    #[inline]
    pub fn with_failures(mut self, n: u32) -> Self {
        self.failures = Some(n);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches error text and label.
    #[inline]
    pub fn with_error(self, err: &crate::PollError) -> Self {
        let mut ev = self.with_reason(err.to_string());
        ev.label = Some(err.as_label());
        ev
    }
}
