//! A minimal channel-based "event occurred" probe: an actor under test
//! holds a `Probe<T>` and calls `probe.event(value)` from inside
//! `receive`; the test thread blocks on the matching `ProbeReceiver<T>`
//! to assert the event happened within a deadline.
//!
//! Kept in-crate rather than pulled in as a separate dependency: the API
//! surface this crate's own tests need is small enough not to justify
//! another crate.

use std::fmt::Debug;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

/// Handed to the actor under test; `Clone` + `Send` so it can live
/// inside actor state and be captured by `Context`-driven closures.
#[derive(Clone)]
pub struct Probe<T>(Sender<T>);

impl<T: Send + 'static> Probe<T> {
    pub fn event(&self, value: T) {
        let _ = self.0.send(value);
    }
}

/// Held by the test thread; blocks waiting for the actor's `event` calls.
pub struct ProbeReceiver<T>(Receiver<T>);

impl<T> ProbeReceiver<T> {
    /// Block for up to `timeout` for the next event.
    pub fn recv(&self, timeout: Duration) -> Option<T> {
        self.0.recv_timeout(timeout).ok()
    }

    /// Assert the next event arrives within `timeout` and equals `expected`.
    pub fn assert_recv(&self, expected: T, timeout: Duration)
    where
        T: PartialEq + Debug,
    {
        match self.recv(timeout) {
            Some(actual) => assert_eq!(actual, expected, "probe received unexpected value"),
            None => panic!("probe timed out waiting for {:?}", expected),
        }
    }

    /// Assert no event arrives within `timeout`.
    pub fn assert_empty(&self, timeout: Duration) {
        if self.recv(timeout).is_some() {
            panic!("probe received an event when none was expected");
        }
    }
}

/// Build a fresh probe/receiver pair. Unbounded: actors under test must
/// never block on a full probe channel.
pub fn probe<T: Send + 'static>() -> (Probe<T>, ProbeReceiver<T>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (Probe(tx), ProbeReceiver(rx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_is_observed() {
        let (p, rx) = probe::<u32>();
        p.event(42);
        rx.assert_recv(42, Duration::from_millis(100));
    }

    #[test]
    fn empty_assertion_holds_when_nothing_sent() {
        let (_p, rx) = probe::<u32>();
        rx.assert_empty(Duration::from_millis(20));
    }
}
