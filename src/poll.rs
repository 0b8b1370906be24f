//! # One-call polling.
//!
//! [`poll`] wires a [`Supervisor`] with [`LogWriter`] plus any extra subscribers,
//! prints every result with [`print_result`] and runs until a termination signal.
//!
//! ```rust,no_run
//! use cadencevisor::{Gateway, PollConfig, poll};
//!
//! async fn monitor<G: Gateway>(drive: &G) {
//!     let stats = poll(drive, PollConfig::default(), Vec::new()).await;
//!     eprintln!("stopped after {} cycles", stats.cycles);
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::config::PollConfig;
use crate::core::{PollStats, Supervisor};
use crate::gateway::{Gateway, Parameter};
use crate::subscribers::{LogWriter, Subscribe};

/// Prints one result as `<parameter right-aligned to 15>: <value>`.
pub fn print_result<V: fmt::Debug + ?Sized>(param: &Parameter, value: &V) {
    println!("{}", format_result(param, value));
}

fn format_result<V: fmt::Debug + ?Sized>(param: &Parameter, value: &V) -> String {
    format!("{param:>15}: {value:?}")
}

/// Polls `gateway` per `cfg` until SIGINT/SIGTERM/SIGQUIT (Ctrl-C off unix).
pub async fn poll<G>(gateway: &G, cfg: PollConfig, subscribers: Vec<Arc<dyn Subscribe>>) -> PollStats
where
    G: Gateway + ?Sized,
{
    let mut subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    subs.extend(subscribers);

    let sup = Supervisor::builder(cfg).with_subscribers(subs).build();
    sup.run_until_signal(gateway, print_result::<G::Value>).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_is_right_aligned() {
        let param = Parameter::from("Output Current");
        assert_eq!(format_result(&param, &7), " Output Current: 7");
        let param = Parameter::from("Speed Ref");
        assert_eq!(format_result(&param, &60.5), "      Speed Ref: 60.5");
    }
}
