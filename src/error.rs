//! Error types produced while polling a device.
//!
//! [`PollError`] covers both failure classes a cycle can hit:
//!
//! - **parameter resolution**: [`PollError::Unrecognized`], [`PollError::NoParameters`];
//! - **I/O**: [`PollError::Io`], [`PollError::Timeout`], [`PollError::Truncated`].
//!
//! The supervisor does not distinguish between them: every error drives the
//! backoff path. The helpers (`as_label`, `as_message`, `is_io`) exist for logs
//! and subscribers.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by a poll.
///
/// Returned by the gateway, the executor and the cycle manager. Never returned by
/// the supervisor loop itself, which converts them into backoff state.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    /// The gateway does not know this parameter and pass-through is disabled.
    #[error("unrecognized parameter {parameter:?}")]
    Unrecognized {
        /// The offending parameter, as supplied.
        parameter: String,
    },

    /// The poll request named no parameters at all.
    #[error("no parameters to poll")]
    NoParameters,

    /// The transport failed during the read (connection loss, malformed reply, ...).
    #[error("i/o failure: {reason}")]
    Io {
        /// Transport-specific description.
        reason: String,
    },

    /// The read did not complete within the configured I/O timeout.
    #[error("read timed out after {timeout:?}")]
    Timeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// The reader ended before producing a value for every requested parameter.
    #[error("read returned {received} of {expected} values")]
    Truncated {
        /// Number of parameters requested.
        expected: usize,
        /// Number of values actually produced.
        received: usize,
    },
}

impl PollError {
    /// Shorthand for [`PollError::Io`].
    pub fn io(reason: impl Into<String>) -> Self {
        PollError::Io {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`PollError::Unrecognized`].
    pub fn unrecognized(parameter: impl Into<String>) -> Self {
        PollError::Unrecognized {
            parameter: parameter.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use cadencevisor::PollError;
    ///
    /// let err = PollError::io("connection reset");
    /// assert_eq!(err.as_label(), "poll_io");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PollError::Unrecognized { .. } => "poll_unrecognized",
            PollError::NoParameters => "poll_no_parameters",
            PollError::Io { .. } => "poll_io",
            PollError::Timeout { .. } => "poll_timeout",
            PollError::Truncated { .. } => "poll_truncated",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            PollError::Unrecognized { parameter } => format!("unrecognized: {parameter}"),
            PollError::NoParameters => "no parameters".to_string(),
            PollError::Io { reason } => format!("io: {reason}"),
            PollError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            PollError::Truncated { expected, received } => {
                format!("truncated: {received}/{expected}")
            }
        }
    }

    /// Indicates whether the error came from the transport rather than from
    /// resolving the request.
    ///
    /// # Example
    /// ```
    /// use cadencevisor::PollError;
    ///
    /// assert!(PollError::io("eof").is_io());
    /// assert!(!PollError::unrecognized("Bogus").is_io());
    /// ```
    pub fn is_io(&self) -> bool {
        !matches!(
            self,
            PollError::Unrecognized { .. } | PollError::NoParameters
        )
    }
}
