//! # LogWriter: events as `tracing` records
//!
//! Renders supervisor events with structured fields. Levels follow how much an
//! operator cares:
//!
//! ```text
//! WARN  poll failed            cycle=12 label="poll_io" reason="i/o failure: connection reset"
//! WARN  polls missed           cycle=13 missed=4
//! INFO  backoff scheduled      delay_ms=1500 failures=2
//! INFO  backoff reset          failures=3
//! INFO  polling stopped        cycles=40 failures=3
//! DEBUG poll completed         cycle=14 results=2 duration_ms=12 delay_ms=988
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// `tracing`-backed event subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::PollStarting => {
                debug!(seq = e.seq, cycle = e.cycle, "poll starting");
            }
            EventKind::PollCompleted => {
                debug!(
                    seq = e.seq,
                    cycle = e.cycle,
                    results = e.results,
                    duration_ms = e.duration_ms,
                    delay_ms = e.delay_ms,
                    "poll completed"
                );
            }
            EventKind::PollPremature => {
                info!(seq = e.seq, cycle = e.cycle, offset_ms = e.duration_ms, "premature poll");
            }
            EventKind::PollsMissed => {
                warn!(seq = e.seq, cycle = e.cycle, missed = e.missed, "polls missed");
            }
            EventKind::PollFailed => {
                warn!(
                    seq = e.seq,
                    cycle = e.cycle,
                    label = e.label,
                    reason = e.reason.as_deref(),
                    "poll failed"
                );
            }
            EventKind::GatewayClosed => {
                debug!(seq = e.seq, "gateway closed");
            }
            EventKind::BackoffScheduled => {
                info!(
                    seq = e.seq,
                    delay_ms = e.delay_ms,
                    failures = e.failures,
                    "backoff scheduled"
                );
            }
            EventKind::BackoffReset => {
                info!(seq = e.seq, failures = e.failures, "backoff reset");
            }
            EventKind::Stopped => {
                info!(seq = e.seq, cycles = e.cycle, failures = e.failures, "polling stopped");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
