//! Centralized error-handler registry.
//!
//! THE CORE wants a single place every unhandled-fault path reports
//! through regardless of which subsystem caught it: a small registry of
//! pluggable handlers keyed by a closed classification enum instead of a
//! free-form string, with a default handler that logs and moves on.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::error;

use crate::identity::Identity;

/// The closed set of failure classifications, carried as a Rust enum
/// rather than a bag of `&str`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureClass {
    Actor,
    Resource,
    Initialization,
    Watchdog,
    Replication,
    ExecuterResource,
    ExecuterClient,
    Pseudo,
}

impl FailureClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureClass::Actor => "actor",
            FailureClass::Resource => "resource",
            FailureClass::Initialization => "initialization",
            FailureClass::Watchdog => "watchdog",
            FailureClass::Replication => "replication",
            FailureClass::ExecuterResource => "executer_resource",
            FailureClass::ExecuterClient => "executer_client",
            FailureClass::Pseudo => "pseudo",
        }
    }
}

impl fmt::Display for FailureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A pluggable failsafe handler: `(class, offending identity, reason)`.
pub type Handler = Box<dyn Fn(FailureClass, Identity, &str) + Send + Sync>;

/// Logs every fault via `tracing::error!` if no handler is registered for
/// its class.
fn default_handler(class: FailureClass, actor: Identity, reason: &str) {
    error!(class = %class, actor = %actor, reason, "unhandled fault reported to failsafe");
}

/// Registry of failure handlers, one slot per [`FailureClass`].
///
/// Cloning a `Failsafe` is cheap and shares the same underlying handler
/// table (`Arc`), so every component that needs to report a fault can
/// hold its own handle.
#[derive(Clone)]
pub struct Failsafe {
    handlers: Arc<RwLock<Vec<Option<Handler>>>>,
}

const CLASS_COUNT: usize = 8;

fn class_index(class: FailureClass) -> usize {
    match class {
        FailureClass::Actor => 0,
        FailureClass::Resource => 1,
        FailureClass::Initialization => 2,
        FailureClass::Watchdog => 3,
        FailureClass::Replication => 4,
        FailureClass::ExecuterResource => 5,
        FailureClass::ExecuterClient => 6,
        FailureClass::Pseudo => 7,
    }
}

impl Failsafe {
    pub fn new() -> Self {
        let mut handlers = Vec::with_capacity(CLASS_COUNT);
        handlers.resize_with(CLASS_COUNT, || None);
        Failsafe {
            handlers: Arc::new(RwLock::new(handlers)),
        }
    }

    /// Install a handler for `class`, replacing any previous one.
    pub fn register(&self, class: FailureClass, handler: Handler) {
        self.handlers.write()[class_index(class)] = Some(handler);
    }

    /// Report a fault. Calls the registered handler for `class`, or
    /// falls back to structured logging if none was registered.
    pub fn report(&self, class: FailureClass, actor: Identity, reason: &str) {
        let guard = self.handlers.read();
        match &guard[class_index(class)] {
            Some(handler) => handler(class, actor, reason),
            None => default_handler(class, actor, reason),
        }
    }
}

impl Default for Failsafe {
    fn default() -> Self {
        Failsafe::new()
    }
}
