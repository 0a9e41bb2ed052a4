//! `Cell`: the runtime envelope around a user `Actor`.
//!
//! Supervision-facing operations (`handle_failure`, `restart`,
//! `terminate`, `death_watch`) stay private methods here; user-facing
//! operations are exposed only through the `Context` façade built in
//! `context.rs`. Behavior dispatch runs through the boxed-closure
//! `BehaviorStack` from `behavior.rs`.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};

use crate::actor::{Actor, ActorFactory};
use crate::behavior::BehaviorStack;
use crate::identity::{Identity, Path};
use crate::mailbox::Mailbox;
use crate::message::Message;
use crate::supervision::RestartWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Ordinary actor, scheduled on the worker pool.
    Normal,
    /// Runs its handler off-worker via the resource executor.
    Resource,
    /// Transient cell backing a synchronous ask/request-reply.
    Pseudo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Started,
    Running,
    Restarting,
    Stopping,
    Stopped,
}

/// Per-cell activation flag: at most one worker run in flight at a time.
pub const ACTIVATION_IDLE: u8 = 0;
pub const ACTIVATION_ACTIVE: u8 = 1;

pub struct Cell {
    identity: Identity,
    path: Path,
    parent: Option<Identity>,
    kind: CellKind,
    mailbox: Mailbox,
    activation: AtomicU8,
    state: Mutex<LifecycleState>,
    actor: Mutex<Option<Box<dyn Actor>>>,
    behaviors: Mutex<Option<BehaviorStack>>,
    factory: Mutex<Option<Arc<dyn ActorFactory>>>,
    children: RwLock<Vec<Identity>>,
    /// Identities watching this cell's termination.
    watchers: RwLock<HashSet<Identity>>,
    /// Identities this cell is watching.
    watching: RwLock<HashSet<Identity>>,
    /// Children we've asked to STOP and are waiting on STOP_SUCCESS for,
    /// as part of this cell's own stop cascade.
    awaiting_child_stop: Mutex<HashSet<Identity>>,
    restart_window: Mutex<RestartWindow>,
    /// Single-flight admission guard for `CellKind::Resource` cells.
    resource_admitted: AtomicBool,
}

impl Cell {
    /// Bare registration record: identity, path, parent, kind. Used
    /// directly by tests exercising the registry; real spawns follow up
    /// with `install` before the cell is scheduled.
    pub fn new(identity: Identity, path: Path, parent: Option<Identity>, kind: CellKind) -> Self {
        Cell {
            identity,
            path,
            parent,
            kind,
            mailbox: Mailbox::new(1_000),
            activation: AtomicU8::new(ACTIVATION_IDLE),
            state: Mutex::new(LifecycleState::Created),
            actor: Mutex::new(None),
            behaviors: Mutex::new(None),
            factory: Mutex::new(None),
            children: RwLock::new(Vec::new()),
            watchers: RwLock::new(HashSet::new()),
            watching: RwLock::new(HashSet::new()),
            awaiting_child_stop: Mutex::new(HashSet::new()),
            restart_window: Mutex::new(RestartWindow::new(3, std::time::Duration::from_secs(60))),
            resource_admitted: AtomicBool::new(false),
        }
    }

    pub fn with_mailbox_size(
        identity: Identity,
        path: Path,
        parent: Option<Identity>,
        kind: CellKind,
        queue_size: usize,
        max_retries: u32,
        within: std::time::Duration,
    ) -> Self {
        let mut cell = Cell::new(identity, path, parent, kind);
        cell.mailbox = Mailbox::new(queue_size);
        cell.restart_window = Mutex::new(RestartWindow::new(max_retries, within));
        cell
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parent(&self) -> Option<Identity> {
        self.parent
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    pub fn set_state(&self, s: LifecycleState) {
        *self.state.lock() = s;
    }

    /// Install the actor instance and its initial behavior (built by the
    /// caller, since wrapping `Actor::receive` into a `Behavior` needs a
    /// `Context`-producing closure that only the system knows how to
    /// build). Called on first start and again after every `Restart`.
    pub fn install(&self, actor: Box<dyn Actor>, behaviors: BehaviorStack) {
        *self.actor.lock() = Some(actor);
        *self.behaviors.lock() = Some(behaviors);
    }

    pub fn set_factory(&self, factory: Arc<dyn ActorFactory>) {
        *self.factory.lock() = Some(factory);
    }

    pub fn factory(&self) -> Option<Arc<dyn ActorFactory>> {
        self.factory.lock().clone()
    }

    pub fn take_actor(&self) -> Option<Box<dyn Actor>> {
        self.actor.lock().take()
    }

    pub fn with_actor<R>(&self, f: impl FnOnce(&mut dyn Actor) -> R) -> Option<R> {
        self.actor.lock().as_deref_mut().map(f)
    }

    /// Try to CAS the activation flag IDLE -> ACTIVE. Returns true if
    /// this call won the race and should schedule the cell onto its
    /// owning worker.
    pub fn try_activate(&self) -> bool {
        self.activation
            .compare_exchange(
                ACTIVATION_IDLE,
                ACTIVATION_ACTIVE,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Called by the worker after draining a batch. Returns true if the
    /// mailbox was empty at the moment of the CAS (flag moved back to
    /// IDLE) — if false, another producer raced in and the cell must be
    /// rescheduled instead of parked, preserving the no-lost-wakeup
    /// guarantee.
    pub fn try_deactivate(&self) -> bool {
        if self.mailbox.is_empty() {
            self.activation
                .compare_exchange(
                    ACTIVATION_ACTIVE,
                    ACTIVATION_IDLE,
                    Ordering::AcqRel,
                    Ordering::Acquire,
                )
                .is_ok()
                && self.mailbox.is_empty()
        } else {
            false
        }
    }

    /// Build the bottom-of-stack behavior that forwards to `Actor::receive`.
    /// Holds only a `Weak` reference to avoid a strong reference cycle
    /// (the closure lives *inside* this same cell's behavior stack).
    pub fn bottom_behavior(self: &Arc<Self>) -> crate::behavior::Behavior {
        let weak = Arc::downgrade(self);
        Box::new(move |ctx: &crate::context::Context, msg: Message| {
            if let Some(cell) = weak.upgrade() {
                cell.with_actor(|actor| actor.receive(ctx, msg));
            }
        })
    }

    pub fn dispatch(&self, ctx: &crate::context::Context, msg: Message) {
        if let Some(stack) = self.behaviors.lock().as_mut() {
            stack.dispatch(ctx, msg);
        }
    }

    pub fn become_(&self, behavior: crate::behavior::Behavior, replace: bool) {
        if let Some(stack) = self.behaviors.lock().as_mut() {
            stack.become_(behavior, replace);
        }
    }

    pub fn unbecome(&self) {
        if let Some(stack) = self.behaviors.lock().as_mut() {
            stack.unbecome();
        }
    }

    pub fn unbecome_all(&self) {
        if let Some(stack) = self.behaviors.lock().as_mut() {
            stack.unbecome_all();
        }
    }

    pub fn stash_push(&self, msg: Message) {
        self.mailbox.stash_push(msg);
    }

    pub fn stash_pop_one(&self) -> Option<Message> {
        self.mailbox.stash_pop_one()
    }

    pub fn add_child(&self, child: Identity) {
        self.children.write().push(child);
    }

    pub fn remove_child(&self, child: Identity) {
        self.children.write().retain(|c| *c != child);
    }

    pub fn children(&self) -> Vec<Identity> {
        self.children.read().clone()
    }

    pub fn has_children(&self) -> bool {
        !self.children.read().is_empty()
    }

    pub fn add_watcher(&self, watcher: Identity) {
        self.watchers.write().insert(watcher);
    }

    pub fn remove_watcher(&self, watcher: Identity) {
        self.watchers.write().remove(&watcher);
    }

    pub fn watchers(&self) -> Vec<Identity> {
        self.watchers.read().iter().copied().collect()
    }

    pub fn add_watching(&self, target: Identity) {
        self.watching.write().insert(target);
    }

    pub fn remove_watching(&self, target: Identity) {
        self.watching.write().remove(&target);
    }

    pub fn mark_awaiting_stop(&self, child: Identity) {
        self.awaiting_child_stop.lock().insert(child);
    }

    /// Record a STOP_SUCCESS from `child`; returns true once every child
    /// we were waiting on has acknowledged.
    pub fn ack_child_stop(&self, child: Identity) -> bool {
        let mut pending = self.awaiting_child_stop.lock();
        pending.remove(&child);
        pending.is_empty()
    }

    pub fn record_restart(&self) -> bool {
        self.restart_window.lock().record_and_check(Instant::now())
    }

    pub fn reset_restart_window(&self) {
        self.restart_window.lock().reset();
    }

    /// Single-flight admission for resource cells: returns true if this
    /// call won admission (must release with `release_resource_slot`).
    pub fn try_admit_resource(&self) -> bool {
        self.resource_admitted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn release_resource_slot(&self) {
        self.resource_admitted.store(false, Ordering::Release);
    }
}
