//! Actor identity: an opaque, cheap-to-hash 128-bit value unique within a
//! process, plus the `/`-joined path strings used for human lookup.

use std::fmt;

use uuid::Uuid;

/// Opaque, globally-unique (within a process) actor identity.
///
/// `Identity` is `Copy` and hashes/compares as a plain 128-bit value, so it
/// is cheap to use as a map key across the registry, mailboxes and
/// supervision bookkeeping.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(Uuid);

impl Identity {
    /// Mint a fresh, random identity.
    pub fn new() -> Self {
        Identity(Uuid::new_v4())
    }

    /// The well-known identity of the system's `/root` actor.
    pub const fn root() -> Self {
        Identity(Uuid::nil())
    }

    pub fn as_u128(&self) -> u128 {
        self.0.as_u128()
    }
}

impl Default for Identity {
    fn default() -> Self {
        Identity::new()
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.0)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A `/`-joined path from the root, e.g. `/user/supervisor/worker-3`.
///
/// Stored as a plain owned `String` rather than `Arc<String>` since the
/// registry, not the cell, is the sole owner of path bindings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Path(String);

impl Path {
    pub fn root() -> Self {
        Path("/root".to_string())
    }

    pub fn child(&self, name: &str) -> Self {
        if self.0.ends_with('/') {
            Path(format!("{}{}", self.0, name))
        } else {
            Path(format!("{}/{}", self.0, name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn from_str(s: &str) -> Self {
        Path(s.to_string())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
