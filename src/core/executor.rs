//! # Executor: one poll.
//!
//! [`execute`] resolves parameters through the gateway, issues exactly one read and
//! returns a lazy [`Polled`] stream pairing each requested parameter with its value.
//!
//! ```text
//! params ──► gateway.parameter_substitution(params, pass_thru) ──► addresses
//!                                                                     │
//!                                              gateway.read(addresses) ──► Reader
//!                                                                     │
//! Polled: zip(params, Reader) ──► (param₀, v₀), (param₁, v₁), ...
//! ```
//!
//! ## Rules
//! - Substitution errors surface from `execute` itself; no read is issued.
//! - All or nothing: a reader that ends early yields [`PollError::Truncated`].
//! - The reader is dropped as soon as the last pair is produced, on the first
//!   error, or when `Polled` is dropped, whichever comes first.
//! - No retries at this level.

use std::pin::Pin;
use std::slice;
use std::task::{Context, Poll, ready};
use std::time::Duration;

use futures::Stream;

use crate::error::PollError;
use crate::gateway::{DEFAULT_PARAMS, Gateway, Parameter, Reader};

/// What to read each cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollRequest {
    /// Parameters, in result order.
    pub params: Vec<Parameter>,
    /// Forward unrecognized parameters as raw addresses instead of rejecting them.
    pub pass_thru: bool,
    /// Per-read I/O timeout (`None` = wait as long as the gateway does).
    pub timeout: Option<Duration>,
}

impl Default for PollRequest {
    /// [`DEFAULT_PARAMS`], no pass-through, no timeout.
    fn default() -> Self {
        Self::new(DEFAULT_PARAMS.to_vec())
    }
}

impl PollRequest {
    /// Creates a request for `params` with pass-through disabled.
    pub fn new(params: Vec<Parameter>) -> Self {
        Self {
            params,
            pass_thru: false,
            timeout: None,
        }
    }

    /// Returns a copy with pass-through set.
    pub fn with_pass_thru(mut self, pass_thru: bool) -> Self {
        self.pass_thru = pass_thru;
        self
    }

    /// Returns a copy with a read timeout (`Duration::ZERO` clears it).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout).filter(|t| !t.is_zero());
        self
    }
}

/// Lazy `(Parameter, Value)` pairs of one read.
///
/// Finite, not restartable. Ends after the last parameter or after the first error.
pub struct Polled<'a, V> {
    params: slice::Iter<'a, Parameter>,
    reader: Option<Reader<'a, V>>,
    expected: usize,
    received: usize,
}

impl<V> Polled<'_, V> {
    /// Number of pairs still to come.
    pub fn remaining(&self) -> usize {
        if self.reader.is_some() {
            self.params.len()
        } else {
            0
        }
    }

    fn release(&mut self) {
        self.reader = None;
    }
}

impl<V> Stream for Polled<'_, V> {
    type Item = Result<(Parameter, V), PollError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let Some(reader) = this.reader.as_mut() else {
            return Poll::Ready(None);
        };
        let Some(param) = this.params.as_slice().first().cloned() else {
            this.release();
            return Poll::Ready(None);
        };

        match ready!(reader.as_mut().poll_next(cx)) {
            Some(Ok(value)) => {
                this.params.next();
                this.received += 1;
                if this.params.len() == 0 {
                    this.release();
                }
                Poll::Ready(Some(Ok((param, value))))
            }
            Some(Err(e)) => {
                this.release();
                Poll::Ready(Some(Err(e)))
            }
            None => {
                this.release();
                Poll::Ready(Some(Err(PollError::Truncated {
                    expected: this.expected,
                    received: this.received,
                })))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}

/// Performs one poll of `params` through `gateway`.
///
/// Returns [`PollError::NoParameters`] for an empty slice and propagates any
/// substitution error. Otherwise exactly one [`Gateway::read`] has been issued
/// and its values are produced lazily by the returned stream.
pub fn execute<'a, G>(
    gateway: &'a G,
    params: &'a [Parameter],
    pass_thru: bool,
) -> Result<Polled<'a, G::Value>, PollError>
where
    G: Gateway + ?Sized,
{
    if params.is_empty() {
        return Err(PollError::NoParameters);
    }
    let addresses = gateway.parameter_substitution(params, pass_thru)?;
    let reader = gateway.read(addresses);

    Ok(Polled {
        params: params.iter(),
        reader: Some(reader),
        expected: params.len(),
        received: 0,
    })
}
