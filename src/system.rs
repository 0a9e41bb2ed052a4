//! `ActorSystem`: owns the registry, dispatcher, timer service, resource
//! executor, watchdog and failsafe registry, and exposes the system
//! handle operations.
//!
//! A three-root-actor topology (`/root`, `/root/user`, `/root/system`),
//! a `shutdown()` that waits for children to terminate, and
//! `ActorSystem::create` starting every subsystem before the handle
//! becomes usable. There is no fourth root for temporary ask-pattern
//! refs and no IO manager or channel pub-sub system; request-reply is
//! handled by the pseudo-cell-based `ask` in `pseudo.rs` instead.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::OnceCell;
use parking_lot::{Condvar, Mutex};
use tracing::{error, info, warn};

use crate::actor::{Actor, ActorFactory};
use crate::autoscale::{AutoscalerDriver, NoopAutoscaler, PodAutoscaler};
use crate::behavior::BehaviorStack;
use crate::cell::{Cell, CellKind, LifecycleState};
use crate::config::Settings;
use crate::context::Context;
use crate::deadletter::{DeadLetterSink, LoggingDeadLetterSink};
use crate::dispatcher::Dispatcher;
use crate::error::KestrelError;
use crate::failsafe::{Failsafe, FailureClass};
use crate::identity::{Identity, Path};
use crate::message::{
    Message, TAG_ACTIVATE, TAG_DEACTIVATE, TAG_HEALTH_CHECK, TAG_KILL, TAG_RESTART,
    TAG_STOP, TAG_STOP_SUCCESS, TAG_TERMINATED,
};
use crate::persistence::{NoopPersistenceDriver, PersistenceDriver};
use crate::pseudo::{self, AskTimeout, PseudoRegistry};
use crate::registry::Registry;
use crate::resource::ResourceExecutor;
use crate::supervision::SupervisorStrategy;
use crate::timer::{TimerService, TimerTarget};
use crate::validate::validate_name;
use crate::watchdog::Watchdog;

/// A no-op `Actor` used for `/root`, `/root/user` and `/root/system`,
/// which exist purely as path anchors and supervision points.
struct RootActor;

impl Actor for RootActor {
    fn receive(&mut self, _ctx: &Context, _msg: Message) {}
}

struct Inner {
    settings: Settings,
    registry: Registry,
    failsafe: Failsafe,
    dead_letters: parking_lot::RwLock<Arc<dyn DeadLetterSink>>,
    pseudo: PseudoRegistry,
    persistence: Arc<dyn PersistenceDriver>,
    autoscaler: Arc<dyn PodAutoscaler>,
    dispatcher: OnceCell<Arc<Dispatcher>>,
    timer: OnceCell<Arc<TimerService>>,
    resource_executor: OnceCell<Arc<ResourceExecutor>>,
    watchdog: OnceCell<Arc<Watchdog>>,
    autoscaler_driver: OnceCell<AutoscalerDriver>,
    root: Identity,
    user_root: Identity,
    system_root: Identity,
    termination: (Mutex<bool>, Condvar),
}

#[derive(Clone)]
pub struct ActorSystem {
    inner: Arc<Inner>,
}

impl ActorSystem {
    /// Build the system shell and its three root cells, but do not yet
    /// start the dispatcher/timer/resource/watchdog threads — call
    /// `start()` once the returned value has somewhere to live, since
    /// those subsystems each need a `clone()` of the finished system.
    pub fn new(settings: Settings) -> Self {
        let registry = Registry::new();
        let root = Identity::root();
        let user_root = Identity::new();
        let system_root = Identity::new();

        let inner = Arc::new(Inner {
            settings,
            registry,
            failsafe: Failsafe::new(),
            dead_letters: parking_lot::RwLock::new(Arc::new(LoggingDeadLetterSink)),
            pseudo: PseudoRegistry::new(),
            persistence: Arc::new(NoopPersistenceDriver),
            autoscaler: Arc::new(NoopAutoscaler),
            dispatcher: OnceCell::new(),
            timer: OnceCell::new(),
            resource_executor: OnceCell::new(),
            watchdog: OnceCell::new(),
            autoscaler_driver: OnceCell::new(),
            root,
            user_root,
            system_root,
            termination: (Mutex::new(false), Condvar::new()),
        });

        let system = ActorSystem { inner };
        system.bootstrap_root(root, Path::root(), None);
        system.bootstrap_root(user_root, Path::root().child("user"), Some(root));
        system.bootstrap_root(system_root, Path::root().child("system"), Some(root));
        system
    }

    /// Build, start every subsystem, and return a ready-to-use system in
    /// one call for the common case.
    pub fn create(settings: Settings) -> Self {
        let system = ActorSystem::new(settings);
        system.start();
        system
    }

    fn bootstrap_root(&self, identity: Identity, path: Path, parent: Option<Identity>) {
        let cell = Arc::new(Cell::with_mailbox_size(
            identity,
            path.clone(),
            parent,
            CellKind::Normal,
            self.inner.settings.queue_size,
            self.inner.settings.max_retries,
            self.inner.settings.within_time_range(),
        ));
        if let Some(parent_id) = parent {
            if let Some(parent_cell) = self.inner.registry.get(parent_id) {
                parent_cell.add_child(identity);
            }
        }
        let behaviors = BehaviorStack::new(cell.bottom_behavior());
        cell.install(Box::new(RootActor), behaviors);
        cell.set_state(LifecycleState::Running);
        self.inner.registry.insert(path, cell);
    }

    fn start(&self) {
        let dispatcher = Arc::new(Dispatcher::start(
            self.inner.settings.parallelism,
            self.inner.settings.throughput,
            self.clone(),
        ));
        let _ = self.inner.dispatcher.set(dispatcher);

        let timer = Arc::new(TimerService::start(self.clone()));
        let _ = self.inner.timer.set(timer);

        let (lo, hi) = self.inner.settings.resource_pool_bounds();
        let resource = ResourceExecutor::new(lo, hi, self.inner.failsafe.clone());
        let _ = self.inner.resource_executor.set(resource);

        if self.inner.settings.watchdog_enabled {
            let watchdog = Arc::new(Watchdog::start(
                self.clone(),
                self.inner.failsafe.clone(),
                self.inner.settings.watchdog_sync_time(),
            ));
            let _ = self.inner.watchdog.set(watchdog);
        }

        if self.inner.settings.horizontal_pod_autoscaler_enabled {
            let registry = self.inner.registry.clone();
            let driver = AutoscalerDriver::start(
                self.inner.autoscaler.clone(),
                move || registry.len(),
                self.inner.settings.parallelism,
                self.inner.settings.horizontal_pod_autoscaler_sync_time(),
            );
            let _ = self.inner.autoscaler_driver.set(driver);
        }

        info!(
            parallelism = self.inner.settings.parallelism,
            "actor system started"
        );
    }

    // -- accessors used by other modules --------------------------------

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn failsafe(&self) -> &Failsafe {
        &self.inner.failsafe
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        self.inner
            .dispatcher
            .get()
            .expect("dispatcher not started; call ActorSystem::start first")
    }

    pub fn timer(&self) -> &Arc<TimerService> {
        self.inner
            .timer
            .get()
            .expect("timer not started; call ActorSystem::start first")
    }

    pub fn resource_executor(&self) -> &Arc<ResourceExecutor> {
        self.inner
            .resource_executor
            .get()
            .expect("resource executor not started; call ActorSystem::start first")
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn root(&self) -> Identity {
        self.inner.root
    }

    pub fn user_root(&self) -> Identity {
        self.inner.user_root
    }

    pub fn system_root(&self) -> Identity {
        self.inner.system_root
    }

    // -- system handle operations -----------------------------------------

    pub fn add_actor(&self, factory: Arc<dyn ActorFactory>, name: &str) -> Result<Identity, KestrelError> {
        self.spawn_child(self.inner.user_root, factory, name)
    }

    /// Like `add_actor`, but marks the new cell as a resource actor: its
    /// messages run on the resource executor's own thread pool, off the
    /// worker pool, one in flight at a time.
    pub fn add_resource_actor(
        &self,
        factory: Arc<dyn ActorFactory>,
        name: &str,
    ) -> Result<Identity, KestrelError> {
        self.spawn_child_kind(self.inner.user_root, factory, name, CellKind::Resource)
    }

    pub fn add_system_actor(
        &self,
        factory: Arc<dyn ActorFactory>,
        base_name: &str,
        count: usize,
    ) -> Result<Vec<Identity>, KestrelError> {
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let name = if count == 1 {
                base_name.to_string()
            } else {
                format!("{}-{}", base_name, i)
            };
            ids.push(self.spawn_child(self.inner.system_root, factory.clone(), &name)?);
        }
        Ok(ids)
    }

    pub fn send(&self, dest: Identity, msg: Message) {
        self.deliver_normal(dest, msg);
    }

    pub fn set_alias(&self, identity: Identity, alias: impl Into<String>) {
        self.inner.registry.bind_alias(alias, identity);
    }

    pub fn get_actor_from_path(&self, path: &str) -> Option<Identity> {
        self.inner.registry.get_by_path(&Path::from_str(path))
    }

    /// Synchronous request/reply on top of the normal send path, via a
    /// transient pseudo-cell completion latch.
    pub fn ask(&self, dest: Identity, msg: Message, timeout: Duration) -> Result<Message, AskTimeout> {
        let (pseudo_id, rx) = self.inner.pseudo.register();
        let msg = msg.shallow_copy(Some(pseudo_id), Some(dest));
        self.deliver_normal(dest, msg);
        pseudo::await_reply(&self.inner.pseudo, pseudo_id, rx, timeout)
    }

    /// Stop `/root/user`'s subtree and, if `wait`, block until every
    /// non-root cell has finished terminating.
    pub fn shutdown(&self, wait: bool) {
        self.stop(self.inner.user_root);
        self.stop(self.inner.system_root);
        if wait {
            self.await_termination();
        }
    }

    pub fn await_termination(&self) {
        let timeout = self.inner.settings.await_termination_timeout();
        let deadline = Instant::now() + timeout;
        let (lock, cv) = &self.inner.termination;
        let mut done = lock.lock();
        while self.inner.registry.len() > 3 {
            let now = Instant::now();
            if now >= deadline {
                warn!("await_termination timed out with cells still registered");
                break;
            }
            cv.wait_for(&mut done, deadline - now);
        }
        if let Some(dispatcher) = self.inner.dispatcher.get() {
            dispatcher.shutdown();
        }
        if let Some(timer) = self.inner.timer.get() {
            timer.shutdown();
        }
        if let Some(watchdog) = self.inner.watchdog.get() {
            watchdog.shutdown();
        }
        if let Some(driver) = self.inner.autoscaler_driver.get() {
            driver.shutdown();
        }
    }

    fn notify_termination_waiters(&self) {
        let (lock, cv) = &self.inner.termination;
        let _guard = lock.lock();
        cv.notify_all();
    }

    // -- delivery ---------------------------------------------------------

    pub fn dead_letter(&self, dest: Option<Identity>, msg: Message) {
        self.inner.dead_letters.read().deliver(dest, msg);
    }

    /// Swap in a custom dead-letter sink, e.g. a test collector in place
    /// of the default log-and-drop behavior.
    pub fn set_dead_letter_sink(&self, sink: Arc<dyn DeadLetterSink>) {
        *self.inner.dead_letters.write() = sink;
    }

    pub fn deliver_normal(&self, dest: Identity, msg: Message) {
        match self.inner.registry.get(dest) {
            Some(cell) => match cell.mailbox().enqueue_normal(msg) {
                Ok(()) => self.activate(&cell),
                Err(full) => self.dead_letter(Some(dest), full.0),
            },
            None => {
                if let Some(msg) = self.inner.pseudo.try_deliver(dest, msg) {
                    self.dead_letter(Some(dest), msg);
                }
            }
        }
    }

    pub fn deliver_priority(&self, dest: Identity, msg: Message) {
        match self.inner.registry.get(dest) {
            Some(cell) => {
                cell.mailbox().enqueue_priority(msg);
                self.activate(&cell);
            }
            None => self.dead_letter(Some(dest), msg),
        }
    }

    pub fn deliver_to_target(&self, target: &TimerTarget, msg: Message) {
        let dest = match target {
            TimerTarget::Identity(id) => Some(*id),
            TimerTarget::Alias(alias) => self.inner.registry.resolve_alias(alias),
        };
        match dest {
            Some(dest) => self.deliver_normal(dest, msg),
            None => self.dead_letter(None, msg),
        }
    }

    fn activate(&self, cell: &Arc<Cell>) {
        if cell.try_activate() {
            self.dispatcher().activate(cell.identity());
        }
    }

    pub fn send_health_check(&self, dest: Identity) {
        if let Some(cell) = self.inner.registry.get(dest) {
            cell.mailbox()
                .enqueue_priority(Message::new((), TAG_HEALTH_CHECK));
            self.activate(&cell);
        }
    }

    // -- lifecycle: spawn / watch / stop ---------------------------------

    pub fn spawn_child(
        &self,
        parent: Identity,
        factory: Arc<dyn ActorFactory>,
        name: &str,
    ) -> Result<Identity, KestrelError> {
        self.spawn_child_kind(parent, factory, name, CellKind::Normal)
    }

    /// Same as `spawn_child`, but lets the caller mark the new cell as a
    /// resource actor, dispatched off the worker pool on the dedicated
    /// resource executor instead of inline on a worker thread.
    pub fn spawn_child_kind(
        &self,
        parent: Identity,
        factory: Arc<dyn ActorFactory>,
        name: &str,
        kind: CellKind,
    ) -> Result<Identity, KestrelError> {
        validate_name(name).map_err(|e| KestrelError::InitializationFailure {
            actor: parent,
            reason: e.to_string(),
        })?;

        let parent_cell = self
            .inner
            .registry
            .get(parent)
            .ok_or_else(|| KestrelError::DeliveryFailure {
                dest: parent,
                reason: "parent cell not registered".into(),
            })?;

        let path = parent_cell.path().child(name);
        if self.inner.registry.get_by_path(&path).is_some() {
            return Err(KestrelError::InitializationFailure {
                actor: parent,
                reason: format!("name \"{}\" already registered under parent", name),
            });
        }

        let identity = Identity::new();
        let cell = Arc::new(Cell::with_mailbox_size(
            identity,
            path.clone(),
            Some(parent),
            kind,
            self.inner.settings.queue_size,
            self.inner.settings.max_retries,
            self.inner.settings.within_time_range(),
        ));
        cell.set_factory(factory.clone());

        // Registration is atomic: update the parent's child-set first,
        // only then make the cell visible to lookups.
        parent_cell.add_child(identity);
        self.inner.registry.insert(path, cell.clone());

        if let Err(reason) = self.start_actor(&cell, factory.as_ref()) {
            self.inner.failsafe.report(FailureClass::Initialization, identity, &reason);
            parent_cell.remove_child(identity);
            self.inner.registry.remove(identity);
            return Err(KestrelError::InitializationFailure { actor: identity, reason });
        }

        Ok(identity)
    }

    fn start_actor(&self, cell: &Arc<Cell>, factory: &dyn ActorFactory) -> Result<(), String> {
        let mut actor = factory.produce();
        let ctx = Context::new(cell.identity(), cell.clone(), self.clone());
        let result = panic::catch_unwind(AssertUnwindSafe(|| actor.pre_start(&ctx)));
        if result.is_err() {
            return Err("pre_start panicked".into());
        }
        let behaviors = BehaviorStack::new(cell.bottom_behavior());
        cell.install(actor, behaviors);
        cell.set_state(LifecycleState::Running);
        Ok(())
    }

    pub fn watch(&self, watcher: Identity, target: Identity) {
        if let Some(cell) = self.inner.registry.get(target) {
            cell.add_watcher(watcher);
        }
        if let Some(watcher_cell) = self.inner.registry.get(watcher) {
            watcher_cell.add_watching(target);
        }
    }

    pub fn unwatch(&self, watcher: Identity, target: Identity) {
        if let Some(cell) = self.inner.registry.get(target) {
            cell.remove_watcher(watcher);
        }
        if let Some(watcher_cell) = self.inner.registry.get(watcher) {
            watcher_cell.remove_watching(target);
        }
    }

    /// `stop(cell)`: enqueues STOP to each child and waits for
    /// STOP_SUCCESS before finalizing its own stop.
    pub fn stop(&self, identity: Identity) {
        let cell = match self.inner.registry.get(identity) {
            Some(c) => c,
            None => return,
        };
        cell.set_state(LifecycleState::Stopping);
        let children = cell.children();
        if children.is_empty() {
            self.finish_stop(&cell);
            return;
        }
        for child in children {
            cell.mark_awaiting_stop(child);
            self.deliver_priority(child, Message::new((), TAG_STOP));
        }
    }

    fn finish_stop(&self, cell: &Arc<Cell>) {
        let ctx = Context::new(cell.identity(), cell.clone(), self.clone());
        if let Some(mut actor) = cell.take_actor() {
            let _ = panic::catch_unwind(AssertUnwindSafe(|| actor.post_stop(&ctx)));
        }
        cell.set_state(LifecycleState::Stopped);

        for watcher in cell.watchers() {
            let terminated = Message::new((), TAG_TERMINATED).shallow_copy(
                Some(cell.identity()),
                Some(watcher),
            );
            self.deliver_normal(watcher, terminated);
        }

        if let Some(parent) = cell.parent() {
            if let Some(parent_cell) = self.inner.registry.get(parent) {
                parent_cell.remove_child(cell.identity());
                // This acknowledges the STOP cascade synchronously; no
                // STOP_SUCCESS message is sent, since the parent's
                // bookkeeping (`awaiting_child_stop`) is updated directly
                // here rather than round-tripping through its mailbox.
                if parent_cell.ack_child_stop(cell.identity())
                    && parent_cell.state() == LifecycleState::Stopping
                    && !parent_cell.has_children()
                {
                    self.finish_stop(&parent_cell);
                }
            }
        }

        self.inner.registry.remove(cell.identity());
        self.notify_termination_waiters();
    }

    // -- reception loop, driven by the dispatcher ------------------------

    /// Process up to `throughput` messages from `cell`'s mailbox,
    /// honoring the priority-first dequeue contract and intercepting
    /// control tags before they ever reach user behavior.
    pub fn run_cell_batch(&self, cell: &Arc<Cell>, throughput: usize) {
        for _ in 0..throughput {
            let msg = match cell.mailbox().dequeue() {
                Some(m) => m,
                None => break,
            };

            if crate::message::is_control_tag(msg.tag) {
                self.handle_control(cell, msg);
                continue;
            }

            if cell.kind() == CellKind::Resource {
                // Resource cells never run their handler on a worker
                // thread; hand the message to the resource executor and
                // stop draining this cell's batch so the
                // worker can move on to other cells instead of blocking.
                self.dispatch_resource(cell, msg);
                break;
            }

            let ctx = Context::new(cell.identity(), cell.clone(), self.clone());
            let result = panic::catch_unwind(AssertUnwindSafe(|| cell.dispatch(&ctx, msg)));
            if let Err(payload) = result {
                let reason = panic_message(&payload);
                self.handle_failure(cell, &reason);
            }
        }
    }

    /// Single-flight-admit `msg` onto the resource executor. If another
    /// execution for this cell is already in flight, the message is put
    /// back on the priority lane (so it isn't lost or reordered behind
    /// newly-arriving normal messages) and the cell is reactivated for a
    /// later visit.
    fn dispatch_resource(&self, cell: &Arc<Cell>, msg: Message) {
        if !cell.try_admit_resource() {
            cell.mailbox().enqueue_priority(msg);
            self.activate(cell);
            return;
        }

        let system = self.clone();
        let job_cell = cell.clone();
        let job: Box<dyn FnOnce() + Send> = Box::new(move || {
            let ctx = Context::new(job_cell.identity(), job_cell.clone(), system.clone());
            let result = panic::catch_unwind(AssertUnwindSafe(|| job_cell.dispatch(&ctx, msg)));
            if let Err(payload) = result {
                let reason = panic_message(&payload);
                system.handle_failure(&job_cell, &reason);
            }
            job_cell.release_resource_slot();
            // Re-admitted messages may have queued while this execution
            // was in flight; reactivate so the worker revisits the cell.
            system.deliver_priority(job_cell.identity(), Message::new((), TAG_ACTIVATE));
        });
        self.resource_executor().submit(cell, job);
    }

    fn handle_control(&self, cell: &Arc<Cell>, msg: Message) {
        match msg.tag {
            TAG_STOP => self.stop(cell.identity()),
            TAG_STOP_SUCCESS => {
                if let Some(child) = msg.source {
                    if cell.ack_child_stop(child) && cell.state() == LifecycleState::Stopping {
                        if !cell.has_children() {
                            self.finish_stop(cell);
                        }
                    }
                }
            }
            TAG_KILL => self.finish_stop(cell),
            TAG_RESTART => self.restart_cell(cell, "explicit RESTART"),
            TAG_HEALTH_CHECK => {
                if let Some(watchdog) = self.inner.watchdog.get() {
                    let _ = watchdog.reply_tx().send(cell.identity());
                }
            }
            TAG_ACTIVATE => {}
            TAG_DEACTIVATE => cell.release_resource_slot(),
            _ => {}
        }
    }

    fn handle_failure(&self, cell: &Arc<Cell>, reason: &str) {
        cell.set_state(LifecycleState::Restarting);
        self.inner
            .failsafe
            .report(FailureClass::Actor, cell.identity(), reason);

        let strategy = cell
            .parent()
            .and_then(|parent| self.inner.registry.get(parent))
            .and_then(|parent_cell| parent_cell.with_actor(|actor| actor.supervisor_strategy()))
            .unwrap_or_default();

        match strategy {
            SupervisorStrategy::Resume => {
                cell.set_state(LifecycleState::Running);
            }
            SupervisorStrategy::Restart => {
                if cell.record_restart() {
                    warn!(actor = %cell.identity(), "restart bound exceeded, stopping instead");
                    self.stop(cell.identity());
                } else {
                    self.restart_cell(cell, reason);
                }
            }
            SupervisorStrategy::Stop => self.stop(cell.identity()),
            SupervisorStrategy::Escalate => {
                if let Some(parent) = cell.parent() {
                    self.handle_failure(&self.inner.registry.get(parent).unwrap_or_else(|| cell.clone()), reason);
                } else {
                    error!(actor = %cell.identity(), "escalation reached root; stopping");
                    self.stop(cell.identity());
                }
            }
        }
    }

    fn restart_cell(&self, cell: &Arc<Cell>, reason: &str) {
        let ctx = Context::new(cell.identity(), cell.clone(), self.clone());
        if let Some(mut actor) = cell.take_actor() {
            let _ = panic::catch_unwind(AssertUnwindSafe(|| actor.pre_restart(&ctx, reason)));
        }

        for child in cell.children() {
            self.stop(child);
        }

        if let Some(factory) = cell.factory() {
            if let Err(err) = self.start_actor(cell, factory.as_ref()) {
                error!(actor = %cell.identity(), error = %err, "restart failed to re-initialize actor");
                self.stop(cell.identity());
                return;
            }
        }

        if let Some(mut actor) = cell.take_actor() {
            let _ = panic::catch_unwind(AssertUnwindSafe(|| actor.post_restart(&ctx)));
            cell.install(actor, BehaviorStack::new(cell.bottom_behavior()));
        }
        cell.set_state(LifecycleState::Running);
    }
}

fn panic_message(payload: &Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "actor panicked with a non-string payload".to_string()
    }
}
