//! Worker pool: P OS threads, each owning a disjoint partition of cells.
//!
//! User handlers must not block inside a worker; blocking work belongs to
//! the resource executor instead. That only makes sense for a synchronous,
//! OS-thread-backed worker loop: a fixed-size pool, a per-worker scheduling
//! queue, graceful park/wake, raw `std::thread` plus CAS activation and a
//! `parking_lot::Condvar` rather than a futures executor.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::identity::Identity;
use crate::system::ActorSystem;

const PARK_SPIN_INTERVAL: Duration = Duration::from_millis(50);

struct Worker {
    scheduling_tx: Sender<Identity>,
    parked: Arc<ParkSignal>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

/// Condvar pair used to wake a parked worker without a busy spin loop.
struct ParkSignal {
    has_work: Mutex<bool>,
    condvar: Condvar,
}

impl ParkSignal {
    fn new() -> Self {
        ParkSignal {
            has_work: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    fn wake(&self) {
        let mut has_work = self.has_work.lock();
        *has_work = true;
        self.condvar.notify_one();
    }

    fn park(&self) {
        let mut has_work = self.has_work.lock();
        if !*has_work {
            self.condvar.wait_for(&mut has_work, PARK_SPIN_INTERVAL);
        }
        *has_work = false;
    }
}

/// Stable identity -> worker index mapping. Hashing the identity gives
/// every worker a roughly-even, registration-time-fixed partition.
fn worker_index(identity: Identity, worker_count: usize) -> usize {
    (identity.as_u128() % worker_count as u128) as usize
}

pub struct Dispatcher {
    workers: Vec<Worker>,
    shutdown: Arc<AtomicBool>,
}

impl Dispatcher {
    /// Spawns `parallelism` worker threads. `system` is not fully built
    /// yet when workers start (it is under construction), so each
    /// worker closes over a `Weak`-free clone that becomes valid once
    /// `ActorSystem::create` finishes wiring itself — callers must not
    /// schedule activity before that point.
    pub fn start(parallelism: usize, throughput: usize, system: ActorSystem) -> Self {
        let parallelism = parallelism.max(1);
        let shutdown = Arc::new(AtomicBool::new(false));
        let mut workers = Vec::with_capacity(parallelism);

        for index in 0..parallelism {
            let (scheduling_tx, scheduling_rx) = crossbeam_channel::unbounded();
            let parked = Arc::new(ParkSignal::new());
            let worker_parked = parked.clone();
            let worker_shutdown = shutdown.clone();
            let worker_system = system.clone();

            let handle = std::thread::Builder::new()
                .name(format!("kestrel-worker-{}", index))
                .spawn(move || {
                    run_worker(
                        index,
                        scheduling_rx,
                        worker_parked,
                        worker_shutdown,
                        worker_system,
                        throughput,
                    )
                })
                .expect("failed to spawn dispatcher worker thread");

            workers.push(Worker {
                scheduling_tx,
                parked,
                handle: Mutex::new(Some(handle)),
            });
        }

        Dispatcher { workers, shutdown }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Send path: push the activation onto the owning worker's
    /// scheduling queue and wake it if parked. The caller has
    /// already enqueued the message into the cell's mailbox and won the
    /// `try_activate` CAS.
    pub fn activate(&self, identity: Identity) {
        let idx = worker_index(identity, self.workers.len());
        let worker = &self.workers[idx];
        let _ = worker.scheduling_tx.send(identity);
        worker.parked.wake();
    }

    /// Signal every worker to stop and join its thread. Takes `&self`
    /// (handles live behind a `Mutex`) so an `Arc<Dispatcher>` shared
    /// with the system handle can still be shut down without needing
    /// sole ownership.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        for worker in &self.workers {
            worker.parked.wake();
        }
        for worker in &self.workers {
            if let Some(handle) = worker.handle.lock().take() {
                let _ = handle.join();
            }
        }
    }
}

fn run_worker(
    index: usize,
    scheduling_rx: Receiver<Identity>,
    parked: Arc<ParkSignal>,
    shutdown: Arc<AtomicBool>,
    system: ActorSystem,
    throughput: usize,
) {
    debug!(worker = index, "dispatcher worker started");
    let mut outbox: Vec<Identity> = Vec::new();

    while !shutdown.load(Ordering::Relaxed) {
        while let Ok(id) = scheduling_rx.try_recv() {
            if !outbox.contains(&id) {
                outbox.push(id);
            }
        }

        if outbox.is_empty() {
            parked.park();
            continue;
        }

        for identity in outbox.drain(..) {
            if let Some(cell) = system.registry().get(identity) {
                system.run_cell_batch(&cell, throughput);
                if !cell.try_deactivate() {
                    // Mailbox gained work during the batch/deactivate race;
                    // reschedule immediately rather than waiting for the
                    // next external activation (no-lost-wakeup guarantee).
                    system.dispatcher().activate(identity);
                }
            }
        }
    }
    debug!(worker = index, "dispatcher worker stopped");
}
