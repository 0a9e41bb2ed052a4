//! The wire format of THE CORE: an immutable, type-erased message envelope.
//!
//! A single struct carries both the type-erased, downcast-on-receive
//! payload and sender/dest bookkeeping in one envelope. Reserved tags are
//! carried as ordinary `i32` values but are intercepted by the cell's
//! reception loop before user code ever sees them: the internal/user split
//! is enforced by control flow, not by a second enum living inside `tag`.

use std::any::Any;
use std::fmt;

use crate::identity::Identity;

/// Reserved tag: orderly stop request (stop cascades to children first).
pub const TAG_STOP: i32 = -1;
/// Reserved tag: acknowledgement that a child finished stopping.
pub const TAG_STOP_SUCCESS: i32 = -2;
/// Reserved tag: immediate, non-cascading termination.
pub const TAG_KILL: i32 = -3;
/// Reserved tag: supervisor-initiated restart.
pub const TAG_RESTART: i32 = -4;
/// Reserved tag: watchdog liveness probe.
pub const TAG_HEALTH_CHECK: i32 = -5;
/// Reserved tag: resource actor admission granted.
pub const TAG_ACTIVATE: i32 = -6;
/// Reserved tag: resource actor admission released.
pub const TAG_DEACTIVATE: i32 = -7;
/// Reserved tag: watchdog probe reply.
pub const TAG_UP: i32 = i32::MAX;
/// Reserved tag: `await(..)` timeout fired.
pub const TAG_TIMEOUT: i32 = i32::MAX - 1;
/// Reserved tag: synthesized on watched-actor termination.
pub const TAG_TERMINATED: i32 = i32::MAX - 2;

/// Lowest tag value reserved for internal use; user tags must stay below
/// this and at or above zero.
pub const RESERVED_NEGATIVE_FLOOR: i32 = -7;
/// Highest tag value reserved for internal use.
pub const RESERVED_POSITIVE_CEIL: i32 = i32::MAX - 2;

/// True if `tag` falls in a range reserved for internal use (either
/// control traffic that never reaches user behavior, or a synthesized
/// tag like TERMINATED that does).
pub fn is_reserved_tag(tag: i32) -> bool {
    tag < 0 || tag >= RESERVED_POSITIVE_CEIL
}

/// True only for the subset of reserved tags the dispatcher intercepts
/// and handles itself (stop/restart/kill/health/activate/deactivate) —
/// these are *never* delivered to user behavior. TERMINATED/TIMEOUT are
/// reserved (user code must not reuse them) but still flow through to
/// user behavior like any other message, since that's the entire point
/// of `watch` and `await(.., timeout)`.
pub fn is_control_tag(tag: i32) -> bool {
    (RESERVED_NEGATIVE_FLOOR..0).contains(&tag)
}

/// Implemented by user message enums via `#[derive(kestrel_macros::Tagged)]`
/// so that `Message::new(payload, payload.tag())` can't drift out of sync
/// with a `match` on the same enum elsewhere in the actor.
pub trait Tagged {
    fn tag(&self) -> i32;
}

/// An immutable, type-erased message.
///
/// Once constructed a `Message` is never mutated; `shallow_copy` and
/// `shallow_copy_dest` move the original envelope into a new one with
/// `source`/`dest` rewritten, carrying `value` (and every other field)
/// across unchanged rather than consuming it — `Box<dyn Any>` can't be
/// cloned without knowing the concrete type, so retargeting a message
/// has to move it rather than copy it.
pub struct Message {
    pub value: Box<dyn Any + Send>,
    pub tag: i32,
    pub source: Option<Identity>,
    pub dest: Option<Identity>,
    pub interaction: Option<Identity>,
    pub protocol: Option<String>,
    pub domain: Option<String>,
}

impl Message {
    pub fn new<T: Any + Send>(value: T, tag: i32) -> Self {
        Message {
            value: Box::new(value),
            tag,
            source: None,
            dest: None,
            interaction: None,
            protocol: None,
            domain: None,
        }
    }

    /// Attempt to downcast the payload to a concrete type, consuming it.
    pub fn downcast<T: Any>(self) -> Result<T, Message> {
        if self.value.is::<T>() {
            let Message {
                value,
                tag,
                source,
                dest,
                interaction,
                protocol,
                domain,
            } = self;
            match value.downcast::<T>() {
                Ok(boxed) => Ok(*boxed),
                Err(value) => Err(Message {
                    value,
                    tag,
                    source,
                    dest,
                    interaction,
                    protocol,
                    domain,
                }),
            }
        } else {
            Err(self)
        }
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// `shallowCopy(newSource, newDest)`: rewrite both endpoints, keep
    /// `value`, `tag`, `interaction`, `protocol`, `domain`.
    pub fn shallow_copy(self, new_source: Option<Identity>, new_dest: Option<Identity>) -> Self {
        Message {
            source: new_source,
            dest: new_dest,
            ..self
        }
    }

    /// `shallowCopy(newDest)`: keep the original sender, retarget `dest`.
    pub fn shallow_copy_dest(self, new_dest: Option<Identity>) -> Self {
        let source = self.source;
        self.shallow_copy(source, new_dest)
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_interaction(mut self, interaction: Identity) -> Self {
        self.interaction = Some(interaction);
        self
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("tag", &self.tag)
            .field("source", &self.source)
            .field("dest", &self.dest)
            .field("interaction", &self.interaction)
            .field("protocol", &self.protocol)
            .field("domain", &self.domain)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcast_roundtrip() {
        let msg = Message::new(42u32, 7);
        let v = msg.downcast::<u32>().unwrap();
        assert_eq!(v, 42);
    }

    #[test]
    fn downcast_wrong_type_returns_message() {
        let msg = Message::new(42u32, 7);
        let msg = msg.downcast::<String>().unwrap_err();
        assert_eq!(msg.tag, 7);
    }

    #[test]
    fn shallow_copy_preserves_fields() {
        let a = Identity::new();
        let b = Identity::new();
        let interaction = Identity::new();
        let msg = Message::new("hi", 3).with_interaction(interaction);
        let msg = msg.shallow_copy(Some(a), Some(b));
        assert_eq!(msg.source, Some(a));
        assert_eq!(msg.dest, Some(b));
        assert_eq!(msg.interaction, Some(interaction));
        assert_eq!(msg.tag, 3);
    }

    #[test]
    fn reserved_tags_are_outside_user_range() {
        assert!(is_reserved_tag(TAG_STOP));
        assert!(is_reserved_tag(TAG_UP));
        assert!(is_reserved_tag(TAG_TIMEOUT));
        assert!(is_reserved_tag(TAG_TERMINATED));
        assert!(!is_reserved_tag(0));
        assert!(!is_reserved_tag(1_000));
    }
}
