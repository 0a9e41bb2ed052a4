//! `kestrel`: an actor runtime core — cells, mailboxes, a worker-pool
//! dispatcher and parent-supervised recovery.
//!
//! The modules below map onto the runtime's components: identity/registry,
//! mailbox, cell, dispatcher, supervision, timer, resource executor,
//! watchdog, failsafe, plus the ambient configuration/error/actor-trait/
//! context surface a program embeds this crate through. Most applications
//! only need `kestrel::prelude::*` and `ActorSystem`.

pub mod actor;
pub mod autoscale;
pub mod behavior;
pub mod cell;
pub mod config;
pub mod context;
pub mod deadletter;
pub mod dispatcher;
pub mod error;
pub mod failsafe;
pub mod identity;
pub mod mailbox;
pub mod message;
pub mod persistence;
pub mod pseudo;
pub mod registry;
pub mod resource;
pub mod supervision;
pub mod system;
pub mod testkit;
pub mod timer;
mod validate;
pub mod watchdog;

/// Everything most user code needs in scope: the actor trait, the
/// message envelope, identities, the system handle and its config.
pub mod prelude {
    pub use crate::actor::{Actor, ActorFactory};
    pub use crate::cell::CellKind;
    pub use crate::config::Settings;
    pub use crate::context::Context;
    pub use crate::deadletter::DeadLetterSink;
    pub use crate::error::KestrelError;
    pub use crate::identity::Identity;
    pub use crate::message::{Message, Tagged};
    pub use crate::supervision::SupervisorStrategy;
    pub use crate::system::ActorSystem;
    pub use kestrel_macros::Tagged;
}
