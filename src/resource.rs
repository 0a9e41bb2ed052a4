//! Resource Executor: off-worker execution for actors marked `Resource`.
//!
//! A submission interface shaped like "hand a closure to a pool and get
//! a handle back", sized off configuration rather than hardcoded. The
//! single-flight admission gate reuses the same CAS pattern
//! `Cell::try_admit_resource` uses for the dispatcher's activation flag.

use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use crate::cell::Cell;
use crate::failsafe::{Failsafe, FailureClass};

type Job = Box<dyn FnOnce() + Send>;

/// A cached pool sized `[parallelism, max_resource_threads]`: it starts
/// with `parallelism` threads and grows up to `max_resource_threads` as
/// submissions queue up.
pub struct ResourceExecutor {
    tx: Sender<Job>,
    rx_template: Receiver<Job>,
    threads: Mutex<Vec<JoinHandle<()>>>,
    max_threads: usize,
    failsafe: Failsafe,
}

impl ResourceExecutor {
    pub fn new(parallelism: usize, max_threads: usize, failsafe: Failsafe) -> Arc<Self> {
        let (tx, rx) = crossbeam_channel::unbounded::<Job>();
        let max_threads = max_threads.max(parallelism).max(1);
        let executor = Arc::new(ResourceExecutor {
            tx,
            rx_template: rx,
            threads: Mutex::new(Vec::new()),
            max_threads,
            failsafe,
        });

        for _ in 0..parallelism.max(1) {
            executor.spawn_thread();
        }
        executor
    }

    fn spawn_thread(&self) {
        let rx = self.rx_template.clone();
        let handle = std::thread::Builder::new()
            .name("kestrel-resource".into())
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    job();
                }
            })
            .expect("failed to spawn resource executor thread");
        self.threads.lock().push(handle);
    }

    /// Submit a task for a resource cell that has already won
    /// single-flight admission (`Cell::try_admit_resource`). Grows the
    /// pool (up to `max_threads`) if every existing thread looks busy,
    /// i.e. the queue already has work backed up.
    pub fn submit(&self, cell: &Arc<Cell>, job: Job) {
        if self.threads.lock().len() < self.max_threads && !self.tx.is_empty() {
            self.spawn_thread();
        }
        if self.tx.send(job).is_err() {
            cell.release_resource_slot();
            self.failsafe.report(
                FailureClass::ExecuterResource,
                cell.identity(),
                "resource executor queue closed",
            );
        }
    }

    pub fn thread_count(&self) -> usize {
        self.threads.lock().len()
    }
}
