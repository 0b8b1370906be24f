//! # Supervisor: the polling loop.
//!
//! The [`Supervisor`] runs the cycle manager until an external [`Completion`]
//! reports done. Between cycles it sleeps in slices of at most
//! [`PollConfig::latency`](crate::PollConfig::latency) so completion is noticed
//! promptly even while a long delay is pending. Failures never end the loop; they
//! push the next attempt out by an exponentially growing backoff that resets on
//! the first success.
//!
//! ## Loop
//! ```text
//! state = { last_poll: None, delay: 0, backoff: None }
//! began = now
//! while !done.is_done() {
//!   ├─► elapsed = now − began
//!   ├─► elapsed < delay ─► sleep(min(latency, delay − elapsed)); continue
//!   ├─► run_cycle(gateway, last_poll, cycle, request)
//!   │       ├─ Ok  ─► last_poll, delay = cycle.last_poll, cycle.delay
//!   │       │         process(param, value) for each result, in order
//!   │       │         backoff = None                      (BackoffReset)
//!   │       └─ Err ─► backoff = None → min                 (warn)
//!   │                 backoff = Some(b) → min(b × m, max)  (debug)
//!   │                 delay = jitter(backoff)             (PollFailed, BackoffScheduled)
//!   │                 failure(err)
//!   └─► began = now
//! }
//! gateway.close()                                          (GatewayClosed, Stopped)
//! ```
//!
//! ## Rules
//! - Cycles are strictly sequential; `process` for cycle N finishes before cycle N+1 starts.
//! - `process` and `failure` run inline on the loop; keep them short.
//! - An in-flight read is never interrupted; completion takes effect between cycles.
//! - The gateway is closed by the cycle manager on every failure, and here on exit.
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use cadencevisor::{Gateway, LogWriter, PollConfig, Supervisor};
//!
//! async fn sample<G: Gateway>(gateway: &G, stop: CancellationToken) {
//!     let mut cfg = PollConfig::default();
//!     cfg.cycle = Duration::from_millis(250);
//!
//!     let sup = Supervisor::builder(cfg)
//!         .with_subscriber(Arc::new(LogWriter::new()))
//!         .build();
//!
//!     let stats = sup
//!         .run(gateway, &stop, |param, value| println!("{param:>15}: {value:?}"))
//!         .await;
//!     println!("{} cycles, {} failures", stats.cycles, stats.failures);
//! }
//! ```

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::PollConfig;
use crate::core::{
    builder::SupervisorBuilder,
    completion::Completion,
    cycle::{Cadence, run_cycle},
    shutdown,
    state::{CycleState, PollStats},
};
use crate::error::PollError;
use crate::events::{Bus, Event, EventKind};
use crate::gateway::{Gateway, Parameter};
use crate::subscribers::{Subscribe, SubscriberSet};

/// Drives one polling loop per `run*` call and reports it on the event bus.
pub struct Supervisor {
    cfg: PollConfig,
    bus: Bus,
    subs: Arc<SubscriberSet>,
}

impl Supervisor {
    /// Creates a supervisor with the given config and subscribers.
    ///
    /// Must be called within a tokio runtime (subscriber workers are spawned here).
    pub fn new(cfg: PollConfig, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(subscribers));
        let sup = Self { cfg, bus, subs };
        sup.subscriber_listener();
        sup
    }

    /// Starts a [`SupervisorBuilder`].
    pub fn builder(cfg: PollConfig) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    /// The configuration this supervisor polls with.
    pub fn config(&self) -> &PollConfig {
        &self.cfg
    }

    /// The event bus; subscribe to observe loops directly.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Forwards bus events to the subscriber set until the bus closes.
    fn subscriber_listener(&self) {
        if self.subs.is_empty() {
            return;
        }
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "event listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    /// Polls until `done`, passing every result to `process`.
    ///
    /// Failures are only reported through logs and the bus; see
    /// [`run_with_failure`](Self::run_with_failure) to observe them inline.
    pub async fn run<G, D, P>(&self, gateway: &G, done: &D, process: P) -> PollStats
    where
        G: Gateway + ?Sized,
        D: Completion + ?Sized,
        P: FnMut(&Parameter, &G::Value),
    {
        self.run_with_failure(gateway, done, process, |_: &PollError| {})
            .await
    }

    /// Polls until a termination signal (SIGINT/SIGTERM/SIGQUIT, or Ctrl-C off unix).
    pub async fn run_until_signal<G, P>(&self, gateway: &G, process: P) -> PollStats
    where
        G: Gateway + ?Sized,
        P: FnMut(&Parameter, &G::Value),
    {
        let token = CancellationToken::new();
        let waiter = tokio::spawn(shutdown::cancel_on_signal(token.clone()));
        let stats = self.run(gateway, &token, process).await;
        waiter.abort();
        stats
    }

    /// Polls until `done`, passing every result to `process` and every failed
    /// cycle's error to `failure`.
    pub async fn run_with_failure<G, D, P, F>(
        &self,
        gateway: &G,
        done: &D,
        mut process: P,
        mut failure: F,
    ) -> PollStats
    where
        G: Gateway + ?Sized,
        D: Completion + ?Sized,
        P: FnMut(&Parameter, &G::Value),
        F: FnMut(&PollError),
    {
        let cycle = self.cfg.cycle();
        let latency = self.cfg.latency();
        let backoff = self.cfg.backoff();
        let request = self.cfg.request();

        let mut state = CycleState::default();
        let mut stats = PollStats::default();
        let mut began = Instant::now();

        while !done.is_done() {
            let elapsed = began.elapsed();
            if elapsed < state.delay {
                time::sleep(latency.min(state.delay - elapsed)).await;
                continue;
            }

            let attempt = stats.attempts() + 1;
            self.bus
                .publish(Event::new(EventKind::PollStarting).with_cycle(attempt));

            match run_cycle(gateway, state.last_poll, cycle, &request).await {
                Ok(polled) => {
                    self.note_cadence(attempt, polled.cadence, &mut stats);
                    state.last_poll = Some(polled.last_poll);
                    state.delay = polled.delay;

                    for (param, value) in &polled.results {
                        process(param, value);
                    }

                    if state.backoff.take().is_some() {
                        self.bus.publish(
                            Event::new(EventKind::BackoffReset).with_failures(state.failures),
                        );
                    }
                    state.failures = 0;
                    stats.cycles += 1;

                    self.bus.publish(
                        Event::new(EventKind::PollCompleted)
                            .with_cycle(attempt)
                            .with_results(polled.results.len())
                            .with_duration(polled.duration())
                            .with_delay(polled.delay),
                    );
                }
                Err(err) => {
                    let base = backoff.next(state.backoff);
                    let delay = backoff.jittered(base);
                    if state.backing_off() {
                        debug!(
                            label = err.as_label(),
                            "polling backoff: waiting {:7.3}s; {err}",
                            delay.as_secs_f64()
                        );
                    } else {
                        warn!(
                            label = err.as_label(),
                            "polling failure: waiting {:7.3}s; {err}",
                            delay.as_secs_f64()
                        );
                    }
                    state.backoff = Some(base);
                    state.failures = state.failures.saturating_add(1);
                    state.delay = delay;
                    stats.failures += 1;

                    self.bus.publish(
                        Event::new(EventKind::PollFailed)
                            .with_cycle(attempt)
                            .with_error(&err),
                    );
                    self.bus.publish(Event::new(EventKind::GatewayClosed));
                    self.bus.publish(
                        Event::new(EventKind::BackoffScheduled)
                            .with_delay(delay)
                            .with_failures(state.failures)
                            .with_reason(err.to_string()),
                    );
                    failure(&err);
                }
            }
            began = Instant::now();
        }

        gateway.close();
        self.bus.publish(Event::new(EventKind::GatewayClosed));
        self.bus.publish(
            Event::new(EventKind::Stopped)
                .with_cycle(stats.attempts())
                .with_failures(stats.failures.min(u64::from(u32::MAX)) as u32),
        );

        stats.state = state;
        stats
    }

    fn note_cadence(&self, attempt: u64, cadence: Cadence, stats: &mut PollStats) {
        match cadence {
            Cadence::Premature { elapsed } => {
                stats.premature += 1;
                self.bus.publish(
                    Event::new(EventKind::PollPremature)
                        .with_cycle(attempt)
                        .with_duration(elapsed),
                );
            }
            Cadence::Missed { cycles, .. } => {
                stats.missed += cycles;
                self.bus.publish(
                    Event::new(EventKind::PollsMissed)
                        .with_cycle(attempt)
                        .with_missed(cycles),
                );
            }
            Cadence::First | Cadence::OnTime => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::completion::CompletionFn;
    use crate::gateway::mock::{MockGateway, Outcome};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn supervisor(cfg: PollConfig) -> Supervisor {
        Supervisor::new(cfg, Vec::new())
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    fn gaps(times: &[Instant]) -> Vec<Duration> {
        times.windows(2).map(|w| w[1] - w[0]).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_then_success() {
        let gw = MockGateway::new().with_script([Outcome::FailAfter(0), Outcome::Ok]);
        let sup = supervisor(PollConfig::default());
        let token = CancellationToken::new();
        let mut rx = sup.bus().subscribe();

        let mut seen = Vec::new();
        let mut errors = Vec::new();
        let stats = sup
            .run_with_failure(
                &gw,
                &token,
                |p, v| {
                    seen.push((p.clone(), *v));
                    if seen.len() == 2 {
                        token.cancel();
                    }
                },
                |e| errors.push(e.clone()),
            )
            .await;

        assert_eq!(errors, vec![PollError::io("connection reset")]);
        assert_eq!(
            seen,
            vec![
                (Parameter::from("Output Current"), 7),
                (Parameter::from("Motor Velocity"), 1800),
            ]
        );
        assert_eq!(gaps(&gw.read_times()), vec![Duration::from_secs(1)]);
        assert_eq!(stats.cycles, 1);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.state.backoff, None);
        assert_eq!(stats.state.failures, 0);
        // once for the failure, once on exit
        assert_eq!(gw.close_count(), 2);

        let kinds: Vec<EventKind> = drain(&mut rx).into_iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&EventKind::BackoffReset));
        assert_eq!(kinds.last(), Some(&EventKind::Stopped));
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_grows_by_multiplier() {
        let gw = MockGateway::new().with_script(std::iter::repeat_n(Outcome::FailAfter(0), 8));
        let sup = supervisor(PollConfig::default());
        let token = CancellationToken::new();
        let mut rx = sup.bus().subscribe();

        let mut failures = 0;
        let stats = sup
            .run_with_failure(&gw, &token, |_, _| {}, |_| {
                failures += 1;
                if failures == 4 {
                    token.cancel();
                }
            })
            .await;

        assert_eq!(
            gaps(&gw.read_times()),
            vec![
                Duration::from_millis(1000),
                Duration::from_millis(1500),
                Duration::from_millis(2250),
            ]
        );
        let delays: Vec<u32> = drain(&mut rx)
            .into_iter()
            .filter(|e| e.kind == EventKind::BackoffScheduled)
            .filter_map(|e| e.delay_ms)
            .collect();
        assert_eq!(delays, vec![1000, 1500, 2250, 3375]);
        assert_eq!(stats.state.backoff, Some(Duration::from_millis(3375)));
        assert_eq!(stats.state.failures, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_capped_at_max() {
        let gw = MockGateway::new().with_script(std::iter::repeat_n(Outcome::FailAfter(0), 10));
        let cfg = PollConfig {
            backoff_min: Some(Duration::from_secs(1)),
            backoff_max: Some(Duration::from_secs(2)),
            ..PollConfig::default()
        };
        let sup = supervisor(cfg);
        let token = CancellationToken::new();

        let mut failures = 0;
        sup.run_with_failure(&gw, &token, |_, _| {}, |_| {
            failures += 1;
            if failures == 5 {
                token.cancel();
            }
        })
        .await;

        assert_eq!(
            gaps(&gw.read_times()),
            vec![
                Duration::from_millis(1000),
                Duration::from_millis(1500),
                Duration::from_millis(2000),
                Duration::from_millis(2000),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_resets_backoff() {
        let gw = MockGateway::new().with_script([
            Outcome::FailAfter(0),
            Outcome::FailAfter(1),
            Outcome::Ok,
            Outcome::FailAfter(0),
        ]);
        let sup = supervisor(PollConfig::default());
        let token = CancellationToken::new();
        let mut rx = sup.bus().subscribe();

        let mut failures = 0;
        let stats = sup
            .run_with_failure(&gw, &token, |_, _| {}, |_| {
                failures += 1;
                if failures == 3 {
                    token.cancel();
                }
            })
            .await;

        let events = drain(&mut rx);
        let delays: Vec<u32> = events
            .iter()
            .filter(|e| e.kind == EventKind::BackoffScheduled)
            .filter_map(|e| e.delay_ms)
            .collect();
        assert_eq!(delays, vec![1000, 1500, 1000]);
        let reset = events
            .iter()
            .find(|e| e.kind == EventKind::BackoffReset)
            .unwrap();
        assert_eq!(reset.failures, Some(2));
        assert_eq!(stats.cycles, 1);
        assert_eq!(stats.failures, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cadence_is_kept_across_cycles() {
        let gw = MockGateway::new().with_latency(Duration::from_millis(100));
        let sup = supervisor(PollConfig::default());
        let token = CancellationToken::new();

        let mut results = 0;
        let stats = sup
            .run(&gw, &token, |_, _| {
                results += 1;
                if results == 8 {
                    token.cancel();
                }
            })
            .await;

        assert_eq!(stats.cycles, 4);
        assert_eq!(stats.premature, 0);
        assert_eq!(stats.missed, 0);
        assert_eq!(gaps(&gw.read_times()), vec![Duration::from_secs(1); 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_reads_report_missed_polls() {
        let gw = MockGateway::new().with_latency(Duration::from_millis(2_500));
        let sup = supervisor(PollConfig::default());
        let token = CancellationToken::new();
        let mut rx = sup.bus().subscribe();

        let mut results = 0;
        let stats = sup
            .run(&gw, &token, |_, _| {
                results += 1;
                if results == 4 {
                    token.cancel();
                }
            })
            .await;

        assert_eq!(stats.cycles, 2);
        assert_eq!(stats.missed, 2);
        let missed: Vec<Option<u64>> = drain(&mut rx)
            .into_iter()
            .filter(|e| e.kind == EventKind::PollsMissed)
            .map(|e| e.missed)
            .collect();
        assert_eq!(missed, vec![Some(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_observed_within_latency() {
        let gw = MockGateway::new().with_script(std::iter::repeat_n(Outcome::FailAfter(0), 4));
        let cfg = PollConfig {
            backoff_min: Some(Duration::from_secs(60)),
            ..PollConfig::default()
        };
        let sup = supervisor(cfg);
        let flag = Arc::new(AtomicBool::new(false));
        let setter = Arc::clone(&flag);
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(2)).await;
            setter.store(true, Ordering::Release);
        });

        let start = Instant::now();
        let stats = sup.run(&gw, &flag, |_, _| {}).await;

        assert!(start.elapsed() <= Duration::from_millis(2_500));
        assert_eq!(gw.read_count(), 1);
        assert_eq!(stats.failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_done_never_reads() {
        let gw = MockGateway::new();
        let sup = supervisor(PollConfig::default());

        let stats = sup.run(&gw, &CompletionFn(|| true), |_, _| {}).await;

        assert_eq!(gw.read_count(), 0);
        assert_eq!(gw.close_count(), 1);
        assert_eq!(stats, PollStats::default());
    }

    async fn scheduled_delays(cfg: PollConfig, failures: usize) -> (Vec<u32>, Vec<Duration>) {
        let gw = MockGateway::new()
            .with_script(std::iter::repeat_n(Outcome::FailAfter(0), failures + 1));
        let sup = supervisor(cfg);
        let token = CancellationToken::new();
        let mut rx = sup.bus().subscribe();

        let mut seen = 0;
        sup.run_with_failure(&gw, &token, |_, _| {}, |_| {
            seen += 1;
            if seen == failures {
                token.cancel();
            }
        })
        .await;

        let delays = drain(&mut rx)
            .into_iter()
            .filter(|e| e.kind == EventKind::BackoffScheduled)
            .filter_map(|e| e.delay_ms)
            .collect();
        (delays, gaps(&gw.read_times()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_backoff_is_min_even_above_max() {
        let cfg = PollConfig {
            backoff_min: Some(Duration::from_secs(10)),
            backoff_max: Some(Duration::from_secs(3)),
            ..PollConfig::default()
        };
        let (delays, gaps) = scheduled_delays(cfg, 3).await;

        assert_eq!(delays, vec![10_000, 3_000, 3_000]);
        assert_eq!(
            gaps,
            vec![Duration::from_secs(10), Duration::from_secs(3)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_decays_with_small_multiplier() {
        let cfg = PollConfig {
            backoff_min: Some(Duration::from_secs(10)),
            backoff_max: Some(Duration::from_secs(3)),
            backoff_multiplier: Some(0.5),
            ..PollConfig::default()
        };
        let (delays, _) = scheduled_delays(cfg, 4).await;

        assert_eq!(delays, vec![10_000, 3_000, 1_500, 750]);
    }
}
