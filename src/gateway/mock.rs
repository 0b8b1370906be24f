//! Scripted in-memory gateway for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::Instant;

use crate::error::PollError;
use crate::gateway::{Gateway, Parameter, Reader};

/// What the next read should do.
#[derive(Clone, Debug)]
pub(crate) enum Outcome {
    Ok,
    /// Yield this many values, then an I/O error.
    FailAfter(usize),
    /// Yield this many values, then end.
    Short(usize),
    /// Never complete.
    Hang,
}

/// Increments a counter when the reader is dropped.
struct Release(Arc<AtomicUsize>);

impl Drop for Release {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub(crate) struct MockGateway {
    known: Vec<(&'static str, i64)>,
    latency: Duration,
    script: Mutex<VecDeque<Outcome>>,
    pub reads: Mutex<Vec<Instant>>,
    pub closes: AtomicUsize,
    pub released: Arc<AtomicUsize>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            known: vec![("Output Current", 7), ("Motor Velocity", 1800), ("Speed Ref", 60)],
            latency: Duration::ZERO,
            script: Mutex::new(VecDeque::new()),
            reads: Mutex::new(Vec::new()),
            closes: AtomicUsize::new(0),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_script(self, outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        self.script.lock().unwrap().extend(outcomes);
        self
    }

    pub fn read_count(&self) -> usize {
        self.reads.lock().unwrap().len()
    }

    pub fn read_times(&self) -> Vec<Instant> {
        self.reads.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn released_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    fn value_of(&self, address: &str) -> i64 {
        self.known
            .iter()
            .find(|(name, _)| *name == address)
            .map(|(_, v)| *v)
            .unwrap_or(address.len() as i64)
    }
}

impl Gateway for MockGateway {
    type Address = String;
    type Value = i64;

    fn parameter_substitution(
        &self,
        params: &[Parameter],
        pass_thru: bool,
    ) -> Result<Vec<String>, PollError> {
        params
            .iter()
            .map(|p| {
                let known = self.known.iter().any(|(name, _)| *name == p.as_str());
                if known || pass_thru {
                    Ok(p.as_str().to_string())
                } else {
                    Err(PollError::unrecognized(p.as_str()))
                }
            })
            .collect()
    }

    fn read(&self, addresses: Vec<String>) -> Reader<'_, i64> {
        self.reads.lock().unwrap().push(Instant::now());
        let outcome = self.script.lock().unwrap().pop_front().unwrap_or(Outcome::Ok);

        let values: Vec<Result<i64, PollError>> =
            addresses.iter().map(|a| Ok(self.value_of(a))).collect();
        let items = match outcome {
            Outcome::Ok => values,
            Outcome::Short(n) => values.into_iter().take(n).collect(),
            Outcome::FailAfter(n) => values
                .into_iter()
                .take(n)
                .chain(std::iter::once(Err(PollError::io("connection reset"))))
                .collect(),
            Outcome::Hang => Vec::new(),
        };
        let hang = matches!(outcome, Outcome::Hang);
        let latency = self.latency;
        let release = Release(Arc::clone(&self.released));

        let wait = stream::once(async move {
            if hang {
                std::future::pending::<()>().await;
            }
            tokio::time::sleep(latency).await;
        })
        .filter_map(|()| async { None::<Result<i64, PollError>> });

        wait.chain(stream::iter(items))
            .map(move |item| {
                let _held = &release;
                item
            })
            .boxed()
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
