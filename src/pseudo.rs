//! Pseudo-cells: synchronous ask/request-reply on top of message passing.
//!
//! A transient cell registered just long enough to receive one reply: a
//! throwaway reply address plus a blocking completion latch (a bounded
//! `crossbeam_channel`) the caller waits on, rather than a second runtime.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use dashmap::DashMap;

use crate::identity::Identity;
use crate::message::Message;

/// Tracks in-flight asks: a pseudo identity maps to the one-shot sender
/// its eventual reply should be delivered to. Never touches the cell
/// registry — a pseudo-cell has no mailbox, no behavior stack, no
/// worker affinity; it is purely an address a reply can be routed to.
#[derive(Clone)]
pub struct PseudoRegistry {
    pending: Arc<DashMap<Identity, Sender<Message>>>,
}

impl PseudoRegistry {
    pub fn new() -> Self {
        PseudoRegistry {
            pending: Arc::new(DashMap::new()),
        }
    }

    /// Mint a fresh pseudo identity and register its completion latch.
    /// Returns the identity to use as `source` on the outgoing request
    /// and the receiver to block on for the reply.
    pub fn register(&self) -> (Identity, Receiver<Message>) {
        let identity = Identity::new();
        let (tx, rx) = crossbeam_channel::bounded(1);
        self.pending.insert(identity, tx);
        (identity, rx)
    }

    /// If `dest` is a pending ask's reply address, deliver `msg` there
    /// and return `None`. Otherwise hand `msg` back so the caller can
    /// route it to the dead-letter sink instead. Called from the normal
    /// send path as a fallback when the registry has no live cell for
    /// `dest`.
    pub fn try_deliver(&self, dest: Identity, msg: Message) -> Option<Message> {
        match self.pending.remove(&dest) {
            Some((_, tx)) => {
                let _ = tx.send(msg);
                None
            }
            None => Some(msg),
        }
    }

    pub fn cancel(&self, identity: Identity) {
        self.pending.remove(&identity);
    }
}

impl Default for PseudoRegistry {
    fn default() -> Self {
        PseudoRegistry::new()
    }
}

/// Error returned when an `ask` doesn't complete in time.
#[derive(Debug)]
pub struct AskTimeout;

/// Block the calling thread for up to `timeout` waiting for a reply to
/// `rx`, cleaning up the pseudo registration either way.
pub fn await_reply(
    registry: &PseudoRegistry,
    identity: Identity,
    rx: Receiver<Message>,
    timeout: Duration,
) -> Result<Message, AskTimeout> {
    let result = rx.recv_timeout(timeout);
    registry.cancel(identity);
    result.map_err(|_| AskTimeout)
}
