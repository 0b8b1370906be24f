//! Polling core: executor, cycle manager and supervisor.
//!
//! - [`executor`]: resolves parameters and issues one read per request;
//! - [`cycle`]: keeps the cadence and closes the gateway on failure;
//! - [`supervisor`]: loops cycles with latency-bounded sleeps and backoff;
//! - [`completion`]: the external "done" signal the loop polls;
//! - [`shutdown`]: cross-platform termination signal handling.

mod builder;
mod completion;
mod cycle;
mod executor;
mod shutdown;
mod state;
mod supervisor;

pub use builder::SupervisorBuilder;
pub use completion::{Completion, CompletionFn, Never};
pub use cycle::{Cadence, Cycle, DEFAULT_CYCLE, advance, run_cycle};
pub use executor::{PollRequest, Polled, execute};
pub use shutdown::wait_for_shutdown_signal;
pub use state::{CycleState, PollStats};
pub use supervisor::Supervisor;
