//! # Completion: when a polling loop should stop.
//!
//! The supervisor checks [`Completion::is_done`] once per loop iteration, and at
//! least every `latency` while waiting for the next cycle. Nothing else can stop it:
//! poll failures never end the loop.
//!
//! Provided implementations:
//! - [`CancellationToken`] done once cancelled (the usual choice);
//! - [`AtomicBool`] done once set to `true`;
//! - [`CompletionFn`] wraps any `Fn() -> bool`;
//! - [`Never`] runs forever;
//! - `Arc<T>` for any of the above.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;

/// Externally observable "stop polling" condition.
pub trait Completion: Send + Sync {
    /// Returns `true` once the loop should exit.
    fn is_done(&self) -> bool;
}

impl Completion for CancellationToken {
    fn is_done(&self) -> bool {
        self.is_cancelled()
    }
}

impl Completion for AtomicBool {
    fn is_done(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<T: Completion + ?Sized> Completion for Arc<T> {
    fn is_done(&self) -> bool {
        (**self).is_done()
    }
}

/// A condition that never completes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Never;

impl Completion for Never {
    fn is_done(&self) -> bool {
        false
    }
}

/// Adapts a predicate into a [`Completion`].
///
/// ```
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use cadencevisor::{Completion, CompletionFn};
///
/// let budget = AtomicU32::new(2);
/// let done = CompletionFn(|| budget.fetch_sub(1, Ordering::Relaxed) == 0);
/// assert!(!done.is_done());
/// assert!(!done.is_done());
/// assert!(done.is_done());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct CompletionFn<F>(pub F);

impl<F> Completion for CompletionFn<F>
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_done(&self) -> bool {
        (self.0)()
    }
}
