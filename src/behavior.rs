//! The behavior stack backing `become`/`unbecome`/`unbecomeAll` and the
//! `await(filter, action, timeout)` convenience.
//!
//! A stack of reception functions owned by the cell: no dynamic dispatch
//! beyond calling the top function, realized as a plain `Vec` of boxed
//! closures rather than a fixed per-actor-type dispatch.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::context::Context;
use crate::message::{Message, TAG_TIMEOUT};
use crate::timer::TimerHandleId;

/// A reception function an actor can `become`. Closures capture whatever
/// state they need; the actor's own `Actor::receive` is wrapped as the
/// bottom-of-stack behavior by the cell.
pub type Behavior = Box<dyn FnMut(&Context, Message) + Send>;

/// Per-cell stack of behaviors. Index 0 is the original (the actor's
/// `receive`); `become(_, replace=false)` pushes, `become(_, true)`
/// replaces the top, `unbecome` pops back to the previous one (never
/// below index 0), `unbecome_all` truncates to just index 0.
pub struct BehaviorStack {
    stack: Vec<Behavior>,
}

impl BehaviorStack {
    pub fn new(original: Behavior) -> Self {
        BehaviorStack {
            stack: vec![original],
        }
    }

    pub fn become_(&mut self, behavior: Behavior, replace: bool) {
        if replace && self.stack.len() > 1 {
            self.stack.pop();
        }
        self.stack.push(behavior);
    }

    pub fn unbecome(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    pub fn unbecome_all(&mut self) {
        self.stack.truncate(1);
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Dispatch `msg` to the top behavior.
    pub fn dispatch(&mut self, ctx: &Context, msg: Message) {
        if let Some(top) = self.stack.last_mut() {
            (top)(ctx, msg);
        }
    }
}

/// Build a `become`-able behavior that only forwards messages matching
/// `filter` to `action`; non-matching messages are stashed so they are
/// not lost while this behavior is active.
///
/// The cell, not this function, is responsible for scheduling the
/// TIMEOUT self-message; this closure pops itself off on first match or
/// on TIMEOUT, and cancels the pending timeout via `pending_timeout` when
/// a real match arrives first.
pub fn awaiting<F, A>(
    mut filter: F,
    mut action: A,
    pending_timeout: Arc<Mutex<Option<TimerHandleId>>>,
) -> Behavior
where
    F: FnMut(&Message) -> bool + Send + 'static,
    A: FnMut(&Context, Message) + Send + 'static,
{
    Box::new(move |ctx, msg| {
        if msg.tag == TAG_TIMEOUT || filter(&msg) {
            if msg.tag != TAG_TIMEOUT {
                if let Some(handle) = pending_timeout.lock().take() {
                    ctx.cancel_timer(handle);
                }
            }
            action(ctx, msg);
            ctx.unbecome();
        } else {
            ctx.stash_push(msg);
        }
    })
}
