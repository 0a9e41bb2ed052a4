//! Watchdog: periodic liveness probe, report-only.
//!
//! A background thread broadcasts a health-check probe to one target per
//! worker and compares replies against a grace period. The watchdog never
//! restarts or stops anything itself — every miss is only ever reported
//! to the failsafe registry.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use tracing::warn;

use crate::failsafe::{Failsafe, FailureClass};
use crate::identity::Identity;
use crate::system::ActorSystem;

/// Fraction of the sync interval given to cells to reply before a miss
/// is reported; kept generous since a miss is only ever logged, never
/// acted on.
const GRACE_FRACTION: u32 = 2;

pub struct Watchdog {
    reply_tx: Sender<Identity>,
    shutdown: Arc<AtomicBool>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Watchdog {
    pub fn start(system: ActorSystem, failsafe: Failsafe, sync_time: Duration) -> Self {
        let (reply_tx, reply_rx) = crossbeam_channel::unbounded();
        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = shutdown.clone();

        let thread = std::thread::Builder::new()
            .name("kestrel-watchdog".into())
            .spawn(move || run_watchdog(system, failsafe, sync_time, reply_rx, thread_shutdown))
            .expect("failed to spawn watchdog thread");

        Watchdog {
            reply_tx,
            shutdown,
            thread: Mutex::new(Some(thread)),
        }
    }

    /// Handed to the dispatcher's internal-control handler so a
    /// `TAG_HEALTH_CHECK` reception can report back without a full
    /// mailbox round trip; the reply never reaches user behavior.
    pub fn reply_tx(&self) -> Sender<Identity> {
        self.reply_tx.clone()
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.lock().take() {
            let _ = handle.join();
        }
    }
}

fn run_watchdog(
    system: ActorSystem,
    failsafe: Failsafe,
    sync_time: Duration,
    reply_rx: Receiver<Identity>,
    shutdown: Arc<AtomicBool>,
) {
    let grace = sync_time / GRACE_FRACTION;

    while !shutdown.load(Ordering::Relaxed) {
        std::thread::sleep(sync_time);
        if shutdown.load(Ordering::Relaxed) {
            return;
        }

        let targets = system.registry().all_identities();
        let mut pending: HashSet<Identity> = targets.iter().copied().collect();
        for id in &targets {
            system.send_health_check(*id);
        }

        let deadline = Instant::now() + grace;
        while !pending.is_empty() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            match reply_rx.recv_timeout(deadline - now) {
                Ok(id) => {
                    pending.remove(&id);
                }
                Err(_) => break,
            }
        }

        for id in pending {
            // The probed cell may have stopped normally between the
            // snapshot and the grace deadline; that's expected churn,
            // not a real miss, so only warn when it's still registered.
            if system.registry().get(id).is_some() {
                warn!(actor = %id, "watchdog: no HEALTH_CHECK reply within grace period");
                failsafe.report(
                    FailureClass::Watchdog,
                    id,
                    "no HEALTH_CHECK reply within grace period",
                );
            }
        }
    }
}
