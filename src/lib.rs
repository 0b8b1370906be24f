//! # cadencevisor
//!
//! **Cadencevisor** polls a device gateway at a steady cadence.
//!
//! A polling loop reads a fixed list of named parameters once per cycle, keeps the
//! cycle schedule free of drift, tells premature, on-time and missed polls apart,
//! and backs off exponentially while the device keeps failing. Any failure closes
//! the gateway so the next attempt starts on a fresh session.
//!
//! ## Architecture
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Supervisor (polling loop)                                   │
//! │  - Completion check every `latency`                          │
//! │  - CycleState { last_poll, delay, backoff, failures }        │
//! │  - BackoffPolicy (min, ×1.5, capped at 10 × min)             │
//! └──────┬───────────────────────────────────────────────┬───────┘
//!        ▼                                               │
//! ┌──────────────────────────────┐                       │ publishes
//! │  run_cycle (cycle manager)   │                       │ - PollStarting
//! │  - advance(last_poll, now)   │                       │ - PollCompleted
//! │  - delay = last + cycle − end│                       │ - PollsMissed
//! │  - close gateway on error    │                       │ - PollFailed
//! └──────┬───────────────────────┘                       │ - BackoffScheduled
//!        ▼                                               │ - ...
//! ┌──────────────────────────────┐                       ▼
//! │  execute (executor)          │          ┌─────────────────────────┐
//! │  - parameter_substitution    │          │  Bus (broadcast)        │
//! │  - one gateway.read()        │          └────────────┬────────────┘
//! │  - Polled: (param, value)…   │                       ▼
//! └──────┬───────────────────────┘              SubscriberSet ──► LogWriter, ...
//!        ▼
//!   Gateway (yours)
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                          |
//! |-------------------|----------------------------------------------------------|---------------------------------------------|
//! | **Gateway**       | Device session the poller reads through.                 | [`Gateway`], [`Parameter`], [`Reader`]      |
//! | **Polling**       | One read, one cycle, or a supervised loop.               | [`execute`], [`run_cycle`], [`Supervisor`]  |
//! | **Completion**    | External stop condition checked by the loop.             | [`Completion`], [`CompletionFn`], [`Never`] |
//! | **Policies**      | Retry delay growth after failed polls.                   | [`BackoffPolicy`], [`JitterPolicy`]         |
//! | **Subscriber API**| Hook into loop events (logging, metrics, ...).           | [`Subscribe`], [`LogWriter`]                |
//! | **Errors**        | Typed poll failures.                                     | [`PollError`]                               |
//! | **Configuration** | Centralize loop settings.                                | [`PollConfig`]                              |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use futures::stream::{self, StreamExt};
//! use tokio_util::sync::CancellationToken;
//! use cadencevisor::{Gateway, Parameter, PollConfig, PollError, Reader, Supervisor};
//!
//! struct Drive;
//!
//! impl Gateway for Drive {
//!     type Address = u16;
//!     type Value = f32;
//!
//!     fn parameter_substitution(&self, params: &[Parameter], _pass_thru: bool) -> Result<Vec<u16>, PollError> {
//!         params
//!             .iter()
//!             .map(|p| match p.as_str() {
//!                 "Output Current" => Ok(3),
//!                 "Motor Velocity" => Ok(24),
//!                 other => Err(PollError::unrecognized(other)),
//!             })
//!             .collect()
//!     }
//!
//!     fn read(&self, addresses: Vec<u16>) -> Reader<'_, f32> {
//!         stream::iter(addresses.into_iter().map(|a| Ok(f32::from(a) * 1.5))).boxed()
//!     }
//!
//!     fn close(&self) {}
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut cfg = PollConfig::default();
//!     cfg.cycle = Duration::from_millis(10);
//!
//!     let sup = Supervisor::builder(cfg).build();
//!     let stop = CancellationToken::new();
//!
//!     let mut seen = 0;
//!     let stats = sup
//!         .run(&Drive, &stop, |param, value| {
//!             println!("{param:>15}: {value}");
//!             seen += 1;
//!             if seen == 4 {
//!                 stop.cancel();
//!             }
//!         })
//!         .await;
//!     assert_eq!(stats.cycles, 2);
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod gateway;
mod policies;
mod poll;
mod subscribers;

// ---- Public re-exports ----

pub use config::{DEFAULT_LATENCY, PollConfig};
pub use core::{
    Cadence, Completion, CompletionFn, Cycle, CycleState, DEFAULT_CYCLE, Never, PollRequest,
    PollStats, Polled, Supervisor, SupervisorBuilder, advance, execute, run_cycle,
    wait_for_shutdown_signal,
};
pub use error::PollError;
pub use events::{Bus, Event, EventKind};
pub use gateway::{DEFAULT_PARAMS, Gateway, Parameter, Reader};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use poll::{poll, print_result};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
