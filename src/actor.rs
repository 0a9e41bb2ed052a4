//! The `Actor` trait: a single-threaded entity owning private state and a
//! synchronous reception function.
//!
//! User handlers run synchronously on a dispatcher worker thread and must
//! not block, so `receive` takes `&mut self` and returns directly rather
//! than returning a future. `pre_restart`/`post_restart` are exposed as
//! two distinct hooks rather than one hook doing double duty.

use crate::context::Context;
use crate::message::Message;
use crate::supervision::SupervisorStrategy;

/// User-implemented actor behavior.
///
/// Only `receive` is required; every lifecycle hook has a no-op default.
pub trait Actor: Send {
    /// Handle one message. Called at most once at a time for a given
    /// cell.
    fn receive(&mut self, ctx: &Context, msg: Message);

    /// Runs once before the cell accepts its first message.
    fn pre_start(&mut self, _ctx: &Context) {}

    /// Runs after a supervisor decides to `Restart` this actor, before
    /// the new instance's `pre_start`. `reason` is the failure that
    /// triggered the restart.
    fn pre_restart(&mut self, _ctx: &Context, _reason: &str) {}

    /// Runs on the freshly-constructed instance immediately after a
    /// restart completes (i.e. after the new instance's `pre_start`).
    fn post_restart(&mut self, _ctx: &Context) {}

    /// Runs once the cell has fully stopped; no further messages will
    /// be delivered.
    fn post_stop(&mut self, _ctx: &Context) {}

    /// How this actor's own failure should be handled by its parent.
    /// Defaults to `Restart`.
    fn supervisor_strategy(&self) -> SupervisorStrategy {
        SupervisorStrategy::default()
    }
}

/// Constructs a fresh `Actor` instance. Used by the cell on initial
/// creation and again on every `Restart`.
pub trait ActorFactory: Send + Sync {
    fn produce(&self) -> Box<dyn Actor>;
}

impl<F> ActorFactory for F
where
    F: Fn() -> Box<dyn Actor> + Send + Sync,
{
    fn produce(&self) -> Box<dyn Actor> {
        (self)()
    }
}
