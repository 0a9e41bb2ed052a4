//! Per-cell mailbox: priority + normal lanes, multi-producer/single-
//! consumer, plus an owner-private stash.
//!
//! The producer side is freely cloned; the consumer side is owned by the
//! dispatcher worker that drains it, and priority messages are always
//! drained ahead of normal ones on every reception.

use std::collections::VecDeque;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use parking_lot::Mutex;

use crate::message::Message;

/// Returned when a bounded lane is full; the caller (the cell's `send`
/// façade) is expected to route this to the dead-letter sink.
pub struct MailboxFull(pub Message);

/// A cell's queues. Any thread may enqueue; only the dispatcher worker
/// that owns this cell is expected to dequeue (a documented contract, not
/// one enforced by the type system since `Receiver` is itself `Sync`).
pub struct Mailbox {
    priority_tx: Sender<Message>,
    priority_rx: Receiver<Message>,
    normal_tx: Sender<Message>,
    normal_rx: Receiver<Message>,
    /// Owner-private stash; never touched by the dispatcher, pushed to
    /// and popped from only via the cell's user-facing façade.
    stash: Mutex<VecDeque<Message>>,
}

impl Mailbox {
    pub fn new(queue_size: usize) -> Self {
        let (priority_tx, priority_rx) = crossbeam_channel::unbounded();
        let cap = queue_size.max(1);
        let (normal_tx, normal_rx) = crossbeam_channel::bounded(cap);
        Mailbox {
            priority_tx,
            priority_rx,
            normal_tx,
            normal_rx,
            stash: Mutex::new(VecDeque::new()),
        }
    }

    /// Priority lane is unbounded: internal control traffic (STOP,
    /// TERMINATED, etc.) must never be rejected for being "full".
    pub fn enqueue_priority(&self, msg: Message) {
        let _ = self.priority_tx.send(msg);
    }

    pub fn enqueue_normal(&self, msg: Message) -> Result<(), MailboxFull> {
        self.normal_tx.try_send(msg).map_err(|err| match err {
            crossbeam_channel::TrySendError::Full(m) => MailboxFull(m),
            crossbeam_channel::TrySendError::Disconnected(m) => MailboxFull(m),
        })
    }

    /// Drain priority first, then normal.
    pub fn dequeue(&self) -> Option<Message> {
        match self.priority_rx.try_recv() {
            Ok(msg) => return Some(msg),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {}
        }
        self.normal_rx.try_recv().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.priority_rx.is_empty() && self.normal_rx.is_empty()
    }

    pub fn stash_push(&self, msg: Message) {
        self.stash.lock().push_back(msg);
    }

    /// Pop the oldest stashed message, if any.
    pub fn stash_pop_one(&self) -> Option<Message> {
        self.stash.lock().pop_front()
    }

    pub fn stash_len(&self) -> usize {
        self.stash.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;

    #[test]
    fn priority_drains_before_normal() {
        let mb = Mailbox::new(8);
        mb.enqueue_normal(Message::new(1u32, 0)).unwrap();
        mb.enqueue_priority(Message::new(2u32, crate::message::TAG_STOP));
        let first = mb.dequeue().unwrap();
        assert_eq!(first.tag, crate::message::TAG_STOP);
        let second = mb.dequeue().unwrap();
        assert_eq!(second.tag, 0);
        assert!(mb.dequeue().is_none());
    }

    #[test]
    fn normal_lane_rejects_when_full() {
        let mb = Mailbox::new(1);
        mb.enqueue_normal(Message::new(1u32, 0)).unwrap();
        let err = mb.enqueue_normal(Message::new(2u32, 0));
        assert!(err.is_err());
    }

    #[test]
    fn stash_is_fifo_and_private() {
        let mb = Mailbox::new(8);
        mb.stash_push(Message::new("a", 0).with_interaction(Identity::new()));
        mb.stash_push(Message::new("b", 0));
        assert_eq!(mb.stash_len(), 2);
        let first = mb.stash_pop_one().unwrap();
        assert_eq!(first.downcast::<&str>().unwrap(), "a");
    }
}
