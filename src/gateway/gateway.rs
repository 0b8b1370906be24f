//! # Gateway: the device session consumed by the poller.
//!
//! The poller never speaks a wire protocol. It needs exactly three things from a
//! session, captured by [`Gateway`]:
//!
//! ```text
//! parameter_substitution(params, pass_thru) ──► Vec<Address>   (may reject unknown names)
//! read(addresses)                           ──► Reader<Value>  (lazy, released on drop)
//! close()                                   ──► ()             (idempotent; next read reconnects)
//! ```
//!
//! ## Rules
//! - `read` issues one request for the whole address set; values arrive in address order.
//! - Dropping the [`Reader`] before it is exhausted abandons the in-flight read and
//!   releases whatever it holds (buffers, pending replies).
//! - After `close()`, the next `read` is expected to open a fresh session.
//! - The poller does not lock around the gateway. A gateway shared by several
//!   supervisors must serialize its own I/O.

use std::fmt;
use std::sync::Arc;

use futures::stream::BoxStream;

use crate::error::PollError;
use crate::gateway::Parameter;

/// Lazy, closable sequence of values produced by one [`Gateway::read`].
pub type Reader<'a, V> = BoxStream<'a, Result<V, PollError>>;

/// A stateful handle to a device session.
///
/// # Example
/// ```
/// use futures::stream::{self, StreamExt};
/// use cadencevisor::{Gateway, Parameter, PollError, Reader};
///
/// struct Fixed;
///
/// impl Gateway for Fixed {
///     type Address = usize;
///     type Value = f32;
///
///     fn parameter_substitution(
///         &self,
///         params: &[Parameter],
///         _pass_thru: bool,
///     ) -> Result<Vec<usize>, PollError> {
///         params
///             .iter()
///             .map(|p| match p.as_str() {
///                 "Output Current" => Ok(0),
///                 "Motor Velocity" => Ok(1),
///                 other => Err(PollError::unrecognized(other)),
///             })
///             .collect()
///     }
///
///     fn read(&self, addresses: Vec<usize>) -> Reader<'_, f32> {
///         stream::iter(addresses.into_iter().map(|a| Ok(a as f32 * 1.5))).boxed()
///     }
///
///     fn close(&self) {}
/// }
/// ```
pub trait Gateway: Send + Sync {
    /// Device-specific read descriptor produced by substitution.
    type Address: Send;
    /// Value read from the device.
    type Value: Send + fmt::Debug;

    /// Translates parameters into read descriptors, in order.
    ///
    /// With `pass_thru == false`, an unknown parameter is an error
    /// ([`PollError::Unrecognized`]). With `pass_thru == true` it is forwarded
    /// verbatim as a raw address.
    fn parameter_substitution(
        &self,
        params: &[Parameter],
        pass_thru: bool,
    ) -> Result<Vec<Self::Address>, PollError>;

    /// Issues one read request for `addresses`.
    fn read(&self, addresses: Vec<Self::Address>) -> Reader<'_, Self::Value>;

    /// Closes the underlying session. Must be idempotent.
    fn close(&self);
}

impl<G: Gateway + ?Sized> Gateway for Arc<G> {
    type Address = G::Address;
    type Value = G::Value;

    fn parameter_substitution(
        &self,
        params: &[Parameter],
        pass_thru: bool,
    ) -> Result<Vec<Self::Address>, PollError> {
        (**self).parameter_substitution(params, pass_thru)
    }

    fn read(&self, addresses: Vec<Self::Address>) -> Reader<'_, Self::Value> {
        (**self).read(addresses)
    }

    fn close(&self) {
        (**self).close()
    }
}
