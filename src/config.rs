//! Runtime configuration.
//!
//! A single flat settings surface, loaded from a TOML file pointed to by
//! an environment variable and applied over hardcoded defaults, with the
//! `config` crate doing the merging instead of hand-rolled `toml::Value`
//! field-by-field digging.

use std::time::Duration;

use config::{Config as RawConfig, ConfigError, Environment, File};
use serde::Deserialize;

/// How persisted events are written: durable or no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistenceMode {
    None,
    Async,
    Sync,
}

impl Default for PersistenceMode {
    fn default() -> Self {
        PersistenceMode::None
    }
}

/// Every runtime knob, flattened into one struct.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Number of dispatcher worker threads. Defaults to `num_cpus::get()`.
    pub parallelism: usize,
    /// Multiplier applied when sizing actor groups (`addSystemActor`).
    pub parallelism_factor: usize,
    /// Upper bound on the resource executor's cached thread pool.
    pub max_resource_threads: usize,
    pub persistence_mode: PersistenceMode,
    pub persistence_driver: Option<String>,
    pub watchdog_enabled: bool,
    pub watchdog_sync_time_ms: u64,
    pub horizontal_pod_autoscaler_enabled: bool,
    pub horizontal_pod_autoscaler_sync_time_ms: u64,
    /// Supervision sliding-window bound: restarts allowed within
    /// `within_time_range_ms` before the child is stopped instead.
    pub max_retries: u32,
    pub within_time_range_ms: u64,
    pub await_termination_timeout_ms: u64,
    /// Per-cell batch budget: max messages a worker drains from one
    /// cell's mailbox before yielding to the next scheduled cell.
    pub throughput: usize,
    /// Bounded capacity of a cell's normal-priority mailbox queue.
    pub queue_size: usize,
    /// Bounded capacity of the dispatcher's per-worker scheduling queue.
    pub buffer_queue_size: usize,
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            parallelism: num_cpus::get().max(1),
            parallelism_factor: 1,
            max_resource_threads: num_cpus::get().max(1) * 4,
            persistence_mode: PersistenceMode::default(),
            persistence_driver: None,
            watchdog_enabled: true,
            watchdog_sync_time_ms: 5_000,
            horizontal_pod_autoscaler_enabled: false,
            horizontal_pod_autoscaler_sync_time_ms: 30_000,
            max_retries: 3,
            within_time_range_ms: 60_000,
            await_termination_timeout_ms: 5_000,
            throughput: 32,
            queue_size: 1_000,
            buffer_queue_size: 1_000,
            debug: false,
        }
    }
}

impl Settings {
    pub fn watchdog_sync_time(&self) -> Duration {
        Duration::from_millis(self.watchdog_sync_time_ms)
    }

    pub fn horizontal_pod_autoscaler_sync_time(&self) -> Duration {
        Duration::from_millis(self.horizontal_pod_autoscaler_sync_time_ms)
    }

    pub fn within_time_range(&self) -> Duration {
        Duration::from_millis(self.within_time_range_ms)
    }

    pub fn await_termination_timeout(&self) -> Duration {
        Duration::from_millis(self.await_termination_timeout_ms)
    }

    /// Resource pool sizing is `[parallelism, max_resource_threads]`.
    pub fn resource_pool_bounds(&self) -> (usize, usize) {
        (self.parallelism, self.max_resource_threads.max(self.parallelism))
    }
}

/// Load settings from `KESTREL_CONF` (system config, defaulting to
/// `config/kestrel.toml`) layered under `KESTREL_APP_CONF` (application
/// overrides, optional) and finally environment variables prefixed
/// `KESTREL_` (e.g. `KESTREL_PARALLELISM=8`).
pub fn load_config() -> Result<Settings, ConfigError> {
    let system_path =
        std::env::var("KESTREL_CONF").unwrap_or_else(|_| "config/kestrel.toml".into());
    let app_path = std::env::var("KESTREL_APP_CONF").unwrap_or_else(|_| "config/app.toml".into());

    let raw = RawConfig::builder()
        .add_source(File::with_name(&system_path).required(false))
        .add_source(File::with_name(&app_path).required(false))
        .add_source(Environment::with_prefix("KESTREL").separator("_"))
        .build()?;

    match raw.try_deserialize::<Settings>() {
        Ok(settings) => Ok(settings),
        Err(ConfigError::NotFound(_)) => Ok(Settings::default()),
        Err(e) => Err(e),
    }
}
