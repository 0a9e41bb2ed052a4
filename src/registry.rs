//! The identity/path/alias registry.
//!
//! One process-wide, identity-keyed map rather than a per-parent,
//! name-keyed one. `DashMap` means concurrent workers resolving different
//! destinations don't serialize on a single lock, which matters once
//! cells are scattered across a worker pool.

use std::sync::Arc;

use dashmap::DashMap;

use crate::cell::Cell;
use crate::identity::{Identity, Path};

/// Process-wide directory of live cells, their paths, and alias bindings.
///
/// Cloning a `Registry` shares the same underlying maps (`Arc`-backed),
/// so every component (dispatcher, system handle, pseudo-cells) can hold
/// its own handle without indirecting through a single owner.
#[derive(Clone)]
pub struct Registry {
    by_identity: Arc<DashMap<Identity, Arc<Cell>>>,
    by_path: Arc<DashMap<Path, Identity>>,
    /// Alias -> set of identities currently bound to it. Resolution picks
    /// the smallest identity in the set, which is arbitrary but
    /// deterministic (stable across calls as long as the set itself is
    /// unchanged) without needing a separate tie-break counter.
    aliases: Arc<DashMap<String, Vec<Identity>>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry {
            by_identity: Arc::new(DashMap::new()),
            by_path: Arc::new(DashMap::new()),
            aliases: Arc::new(DashMap::new()),
        }
    }

    pub fn insert(&self, path: Path, cell: Arc<Cell>) {
        let identity = cell.identity();
        self.by_path.insert(path, identity);
        self.by_identity.insert(identity, cell);
    }

    pub fn get(&self, identity: Identity) -> Option<Arc<Cell>> {
        self.by_identity.get(&identity).map(|e| e.value().clone())
    }

    pub fn get_by_path(&self, path: &Path) -> Option<Arc<Cell>> {
        let identity = *self.by_path.get(path)?.value();
        self.get(identity)
    }

    pub fn path_of(&self, identity: Identity) -> Option<Path> {
        self.get(identity).map(|c| c.path().clone())
    }

    /// Remove a cell from the registry entirely. Called once a cell
    /// finishes `postStop` so that the stop cascade's "no descendant
    /// cell is registered" invariant holds.
    pub fn remove(&self, identity: Identity) {
        if let Some((_, cell)) = self.by_identity.remove(&identity) {
            self.by_path.remove(cell.path());
        }
        for mut entry in self.aliases.iter_mut() {
            entry.value_mut().retain(|id| *id != identity);
        }
        self.aliases.retain(|_, ids| !ids.is_empty());
    }

    pub fn bind_alias(&self, alias: impl Into<String>, identity: Identity) {
        self.aliases
            .entry(alias.into())
            .or_insert_with(Vec::new)
            .push(identity);
    }

    pub fn unbind_alias(&self, alias: &str, identity: Identity) {
        if let Some(mut ids) = self.aliases.get_mut(alias) {
            ids.retain(|id| *id != identity);
        }
    }

    /// Resolve an alias to a single identity, picking the smallest
    /// identity currently bound (arbitrary but deterministic).
    pub fn resolve_alias(&self, alias: &str) -> Option<Identity> {
        self.aliases
            .get(alias)
            .and_then(|ids| ids.iter().min().copied())
    }

    /// Snapshot of every currently-registered identity. Used by the
    /// watchdog to pick liveness-probe targets and by `print_tree`-style
    /// diagnostics; callers should tolerate entries that vanish between
    /// the snapshot and use.
    pub fn all_identities(&self) -> Vec<Identity> {
        self.by_identity.iter().map(|e| *e.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellKind;

    fn test_cell(path: Path) -> Arc<Cell> {
        Arc::new(Cell::new(Identity::new(), path, None, CellKind::Normal))
    }

    #[test]
    fn insert_and_get_roundtrip() {
        let reg = Registry::new();
        let cell = test_cell(Path::root().child("a"));
        let id = cell.identity();
        reg.insert(cell.path().clone(), cell.clone());
        assert!(reg.get(id).is_some());
        assert!(reg.get_by_path(&Path::root().child("a")).is_some());
    }

    #[test]
    fn remove_clears_path_and_aliases() {
        let reg = Registry::new();
        let cell = test_cell(Path::root().child("b"));
        let id = cell.identity();
        reg.insert(cell.path().clone(), cell.clone());
        reg.bind_alias("worker", id);
        reg.remove(id);
        assert!(reg.get(id).is_none());
        assert!(reg.get_by_path(&Path::root().child("b")).is_none());
        assert!(reg.resolve_alias("worker").is_none());
    }

    #[test]
    fn alias_resolution_is_deterministic() {
        let reg = Registry::new();
        let a = test_cell(Path::root().child("c1"));
        let b = test_cell(Path::root().child("c2"));
        reg.insert(a.path().clone(), a.clone());
        reg.insert(b.path().clone(), b.clone());
        reg.bind_alias("group", a.identity());
        reg.bind_alias("group", b.identity());
        let expected = a.identity().min(b.identity());
        assert_eq!(reg.resolve_alias("group"), Some(expected));
        // Calling again without mutating the set yields the same answer.
        assert_eq!(reg.resolve_alias("group"), Some(expected));
    }
}
