//! `Context`: the per-invocation façade user code receives in `Actor::receive`
//! and every lifecycle hook.
//!
//! A single struct with plain methods delegating to the owning cell,
//! since THE CORE has one concrete `Message` type rather than a generic
//! payload type needing trait-based dispatch per call site.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::actor::ActorFactory;
use crate::behavior::{awaiting, Behavior};
use crate::cell::Cell;
use crate::error::KestrelError;
use crate::identity::Identity;
use crate::message::{Message, TAG_TIMEOUT};
use crate::system::ActorSystem;
use crate::timer::TimerHandleId;

pub struct Context {
    pub myself: Identity,
    pub(crate) cell: Arc<Cell>,
    pub(crate) system: ActorSystem,
}

impl Context {
    pub(crate) fn new(myself: Identity, cell: Arc<Cell>, system: ActorSystem) -> Self {
        Context { myself, cell, system }
    }

    pub fn system(&self) -> &ActorSystem {
        &self.system
    }

    /// `send(message)`: copies sender-id into the message, resolves
    /// destination, enqueues.
    pub fn send(&self, dest: Identity, msg: Message) {
        let msg = msg.shallow_copy(Some(self.myself), Some(dest));
        self.system.deliver_normal(dest, msg);
    }

    /// `sendViaAlias(message, alias)`: resolves alias then as above; if
    /// unbound, the message goes to the dead-letter sink.
    pub fn send_via_alias(&self, alias: &str, msg: Message) {
        match self.system.registry().resolve_alias(alias) {
            Some(dest) => self.send(dest, msg),
            None => {
                let msg = msg.shallow_copy(Some(self.myself), None);
                self.system.dead_letter(None, msg);
            }
        }
    }

    /// `priority(message)`: enqueues in the priority lane.
    pub fn priority(&self, dest: Identity, msg: Message) {
        let msg = msg.shallow_copy(Some(self.myself), Some(dest));
        self.system.deliver_priority(dest, msg);
    }

    /// `forward(message, dest)`: re-sends with the original sender
    /// preserved but a new destination.
    pub fn forward(&self, msg: Message, dest: Identity) {
        let msg = msg.shallow_copy_dest(Some(dest));
        self.system.deliver_normal(dest, msg);
    }

    pub fn become_(&self, behavior: Behavior, replace: bool) {
        self.cell.become_(behavior, replace);
    }

    pub fn unbecome(&self) {
        self.cell.unbecome();
    }

    pub fn unbecome_all(&self) {
        self.cell.unbecome_all();
    }

    /// `await(filter, action, timeout?)`: becomes a behavior that routes
    /// only matching messages to `action`; schedules a self `TIMEOUT`
    /// via the timer service when a timeout is given, and cancels it on
    /// first match.
    pub fn await_matching<F, A>(&self, filter: F, action: A, timeout: Option<Duration>)
    where
        F: FnMut(&Message) -> bool + Send + 'static,
        A: FnMut(&Context, Message) + Send + 'static,
    {
        let pending_timeout = Arc::new(Mutex::new(None));
        self.cell
            .become_(awaiting(filter, action, pending_timeout.clone()), false);
        if let Some(timeout) = timeout {
            let myself = self.myself;
            let handle = self.system.timer().schedule_once(
                crate::timer::TimerTarget::Identity(myself),
                Arc::new(|| Message::new((), TAG_TIMEOUT)),
                timeout,
            );
            *pending_timeout.lock() = Some(handle);
        }
    }

    pub fn stash_push(&self, msg: Message) {
        self.cell.stash_push(msg);
    }

    pub fn stash_pop_one(&self) -> Option<Message> {
        self.cell.stash_pop_one()
    }

    /// `addChild(factory[, instances])`: registers one or many children
    /// under this cell.
    pub fn add_child(
        &self,
        factory: Arc<dyn ActorFactory>,
        name: &str,
    ) -> Result<Identity, KestrelError> {
        self.system.spawn_child(self.myself, factory, name)
    }

    pub fn add_children(
        &self,
        factory: Arc<dyn ActorFactory>,
        base_name: &str,
        instances: usize,
    ) -> Result<Vec<Identity>, KestrelError> {
        let mut ids = Vec::with_capacity(instances);
        for i in 0..instances {
            let name = format!("{}-{}", base_name, i);
            ids.push(self.system.spawn_child(self.myself, factory.clone(), &name)?);
        }
        Ok(ids)
    }

    /// `watch(dest)`: registers interest in `dest`'s termination.
    pub fn watch(&self, dest: Identity) {
        self.system.watch(self.myself, dest);
    }

    pub fn unwatch(&self, dest: Identity) {
        self.system.unwatch(self.myself, dest);
    }

    /// `stop()`: transitions the cell toward STOPPED.
    pub fn stop(&self) {
        self.system.stop(self.myself);
    }

    pub fn schedule_once(
        &self,
        dest: Identity,
        factory: Arc<dyn Fn() -> Message + Send + Sync>,
        delay: Duration,
    ) -> TimerHandleId {
        self.system
            .timer()
            .schedule_once(crate::timer::TimerTarget::Identity(dest), factory, delay)
    }

    pub fn schedule_at_fixed_rate(
        &self,
        dest: Identity,
        factory: Arc<dyn Fn() -> Message + Send + Sync>,
        initial_delay: Duration,
        period: Duration,
    ) -> TimerHandleId {
        self.system.timer().schedule_at_fixed_rate(
            crate::timer::TimerTarget::Identity(dest),
            factory,
            initial_delay,
            period,
        )
    }

    pub fn cancel_timer(&self, handle: TimerHandleId) {
        self.system.timer().cancel(handle);
    }
}
