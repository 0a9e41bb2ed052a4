//! Pod-autoscaler collaborator interface: a periodic callback with no
//! direct core coupling.
//!
//! Shaped like `watchdog.rs`'s probe loop, since both are periodic
//! background callbacks gated by a `config.rs` enabled flag and
//! sync-time interval. Kept deliberately thin: THE CORE only calls the
//! callback on a timer, it has no opinion on what scaling decision
//! follows.

pub trait PodAutoscaler: Send + Sync {
    /// Invoked every `horizontal_pod_autoscaler_sync_time_ms`. `active_cells`
    /// and `worker_count` are a snapshot for the callback to reason about;
    /// THE CORE does not act on the return value.
    fn on_tick(&self, active_cells: usize, worker_count: usize);
}

/// Used when `horizontal_pod_autoscaler_enabled` is false (the default).
pub struct NoopAutoscaler;

impl PodAutoscaler for NoopAutoscaler {
    fn on_tick(&self, _active_cells: usize, _worker_count: usize) {}
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;

/// Drives `PodAutoscaler::on_tick` on a dedicated background thread, the
/// same "sleep, snapshot, callback" shape as `watchdog.rs`'s probe loop.
/// THE CORE has no opinion on what the callback decides; it only ever
/// calls it.
pub struct AutoscalerDriver {
    shutdown: Arc<AtomicBool>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl AutoscalerDriver {
    pub fn start(
        autoscaler: Arc<dyn PodAutoscaler>,
        active_cells: impl Fn() -> usize + Send + 'static,
        worker_count: usize,
        sync_time: Duration,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let thread_shutdown = shutdown.clone();

        let thread = std::thread::Builder::new()
            .name("kestrel-autoscaler".into())
            .spawn(move || {
                while !thread_shutdown.load(Ordering::Relaxed) {
                    std::thread::sleep(sync_time);
                    if thread_shutdown.load(Ordering::Relaxed) {
                        return;
                    }
                    autoscaler.on_tick(active_cells(), worker_count);
                }
            })
            .expect("failed to spawn autoscaler thread");

        AutoscalerDriver {
            shutdown,
            thread: Mutex::new(Some(thread)),
        }
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.lock().take() {
            let _ = handle.join();
        }
    }
}
