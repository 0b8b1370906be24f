//! Device session abstraction.
//!
//! - [`Gateway`] the session the poller reads through
//! - [`Reader`] the lazy value stream returned by one read
//! - [`Parameter`] identifier of one device value, plus [`DEFAULT_PARAMS`]

#[allow(clippy::module_inception)]
mod gateway;
mod parameter;

#[cfg(test)]
pub(crate) mod mock;

pub use gateway::{Gateway, Reader};
pub use parameter::{DEFAULT_PARAMS, Parameter};
