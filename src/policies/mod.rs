//! Retry policies.
//!
//! ## Contents
//! - [`BackoffPolicy`] how the retry delay grows after consecutive failed polls
//! - [`JitterPolicy`]  optional randomization of that delay
//!
//! ## Wiring
//! ```text
//! PollConfig { backoff_min, backoff_multiplier, backoff_max, jitter }
//!      └─► PollConfig::backoff() ─► BackoffPolicy
//!               └─► core::supervisor uses backoff.next(prev base) after each failed cycle
//! ```
//!
//! ## Defaults
//! - first = cycle (or 1s), factor = 1.5, max = 10 × first, jitter = None.

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
