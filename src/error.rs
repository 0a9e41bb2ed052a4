//! THE CORE's error taxonomy: a single closed, classifiable enum rather
//! than scattered ad hoc error structs per subsystem.

use thiserror::Error;

use crate::identity::Identity;

/// The five failure classes this crate distinguishes.
#[derive(Debug, Error)]
pub enum KestrelError {
    /// A user `Actor::receive` (or a lifecycle hook) panicked or returned
    /// an error while processing a message.
    #[error("actor {actor} failed handling a message: {reason}")]
    UserHandlerFailure { actor: Identity, reason: String },

    /// `pre_start` (or a resource actor's setup) failed before the actor
    /// ever became reachable.
    #[error("actor {actor} failed to initialize: {reason}")]
    InitializationFailure { actor: Identity, reason: String },

    /// A message could not be delivered: destination unknown, mailbox
    /// closed, or the cell already stopped.
    #[error("could not deliver message to {dest}: {reason}")]
    DeliveryFailure { dest: Identity, reason: String },

    /// A resource actor's submission was rejected by the resource
    /// executor's admission control.
    #[error("resource submission rejected for {actor}: {reason}")]
    ResourceRejection { actor: Identity, reason: String },

    /// An internal invariant was violated; THE CORE itself is in a bad
    /// state and the surrounding system should treat this as fatal.
    #[error("internal invariant violated: {0}")]
    InternalFatal(String),
}

impl KestrelError {
    pub fn actor(&self) -> Option<Identity> {
        match self {
            KestrelError::UserHandlerFailure { actor, .. } => Some(*actor),
            KestrelError::InitializationFailure { actor, .. } => Some(*actor),
            KestrelError::DeliveryFailure { dest, .. } => Some(*dest),
            KestrelError::ResourceRejection { actor, .. } => Some(*actor),
            KestrelError::InternalFatal(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, KestrelError>;
