//! Persistence driver collaborator interface.
//!
//! THE CORE keeps only the seam: a trait a real event store would
//! implement, with a no-op default so `persistence_mode = none` (the
//! default, per `config.rs`) needs no driver at all.

use crate::identity::Identity;
use crate::message::Message;

/// An event persisted (or to be persisted) for a given actor.
pub struct PersistedEvent {
    pub actor: Identity,
    pub sequence: u64,
    pub payload: Vec<u8>,
}

/// Collaborator interface only: THE CORE calls this when
/// `persistence_mode` is `Async`/`Sync`, but ships no concrete store.
pub trait PersistenceDriver: Send + Sync {
    fn persist(&self, actor: Identity, msg: &Message) -> Result<(), String>;
    fn recover(&self, actor: Identity) -> Vec<PersistedEvent>;
}

/// Used when `persistence_mode` is `None` (the default).
pub struct NoopPersistenceDriver;

impl PersistenceDriver for NoopPersistenceDriver {
    fn persist(&self, _actor: Identity, _msg: &Message) -> Result<(), String> {
        Ok(())
    }

    fn recover(&self, _actor: Identity) -> Vec<PersistedEvent> {
        Vec::new()
    }
}
