//! Timer Service: `schedule_once`/`schedule_at_fixed_rate`/`cancel`.
//!
//! A dedicated thread drains a job queue (`Once`/`Repeat`/`Cancel`,
//! ordered by next-fire time). Jobs carry a `Message` *factory*, not a
//! message, since a fired job must hand the cell a fresh message each
//! time and `Message`'s `Box<dyn Any>` payload can't be cloned without
//! knowing its concrete type.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use crate::identity::Identity;
use crate::message::Message;
use crate::system::ActorSystem;

/// Opaque cancellation handle returned by `schedule_once`/
/// `schedule_at_fixed_rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandleId(u64);

/// Where a fired message goes: a concrete identity or an alias resolved
/// at fire time (so a fixed-rate job tracks a changing alias binding).
#[derive(Clone)]
pub enum TimerTarget {
    Identity(Identity),
    Alias(String),
}

type MessageFactory = Arc<dyn Fn() -> Message + Send + Sync>;

struct Job {
    id: u64,
    fire_at: Instant,
    period: Option<Duration>,
    target: TimerTarget,
    factory: MessageFactory,
}

enum Command {
    Schedule(Job),
    Cancel(u64),
    Shutdown,
}

/// Next-fire-time ordering for the min-heap; ties broken by id so
/// cancellation lookups stay deterministic.
struct HeapKey(Instant, u64);

impl PartialEq for HeapKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 == other.1
    }
}
impl Eq for HeapKey {}
impl PartialOrd for HeapKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0).then(self.1.cmp(&other.1))
    }
}

pub struct TimerService {
    tx: Sender<Command>,
    next_id: AtomicU64,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl TimerService {
    /// Starts the single global timer thread. `system` is used purely to
    /// deliver fired messages (`ActorSystem::deliver_to_target`); same
    /// two-phase-construction caveat as `Dispatcher::start`.
    pub fn start(system: ActorSystem) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let thread = std::thread::Builder::new()
            .name("kestrel-timer".into())
            .spawn(move || run_timer(rx, system))
            .expect("failed to spawn timer thread");

        TimerService {
            tx,
            next_id: AtomicU64::new(1),
            thread: Mutex::new(Some(thread)),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn schedule_once(
        &self,
        target: TimerTarget,
        factory: MessageFactory,
        delay: Duration,
    ) -> TimerHandleId {
        let id = self.next_id();
        let _ = self.tx.send(Command::Schedule(Job {
            id,
            fire_at: Instant::now() + delay,
            period: None,
            target,
            factory,
        }));
        TimerHandleId(id)
    }

    pub fn schedule_at_fixed_rate(
        &self,
        target: TimerTarget,
        factory: MessageFactory,
        initial_delay: Duration,
        period: Duration,
    ) -> TimerHandleId {
        let id = self.next_id();
        let _ = self.tx.send(Command::Schedule(Job {
            id,
            fire_at: Instant::now() + initial_delay,
            period: Some(period),
            target,
            factory,
        }));
        TimerHandleId(id)
    }

    pub fn cancel(&self, handle: TimerHandleId) {
        let _ = self.tx.send(Command::Cancel(handle.0));
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
        if let Some(handle) = self.thread.lock().take() {
            let _ = handle.join();
        }
    }
}

fn run_timer(rx: Receiver<Command>, system: ActorSystem) {
    let mut heap: BinaryHeap<Reverse<HeapKey>> = BinaryHeap::new();
    let mut jobs: HashMap<u64, Job> = HashMap::new();

    loop {
        let timeout = heap
            .peek()
            .map(|Reverse(key)| key.0.saturating_duration_since(Instant::now()))
            .unwrap_or(Duration::from_secs(3600));

        let recv = rx.recv_timeout(timeout);
        match recv {
            Ok(Command::Schedule(job)) => {
                heap.push(Reverse(HeapKey(job.fire_at, job.id)));
                jobs.insert(job.id, job);
            }
            Ok(Command::Cancel(id)) => {
                jobs.remove(&id);
            }
            Ok(Command::Shutdown) => return,
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => return,
        }

        let now = Instant::now();
        while let Some(Reverse(HeapKey(fire_at, id))) = heap.peek().copied() {
            if fire_at > now {
                break;
            }
            heap.pop();
            if let Some(job) = jobs.remove(&id) {
                let msg = (job.factory)();
                system.deliver_to_target(&job.target, msg);
                if let Some(period) = job.period {
                    let next = Job {
                        id,
                        fire_at: now + period,
                        period: Some(period),
                        target: job.target,
                        factory: job.factory,
                    };
                    heap.push(Reverse(HeapKey(next.fire_at, next.id)));
                    jobs.insert(id, next);
                }
            }
        }
    }
}

impl Clone for HeapKey {
    fn clone(&self) -> Self {
        HeapKey(self.0, self.1)
    }
}
impl Copy for HeapKey {}
