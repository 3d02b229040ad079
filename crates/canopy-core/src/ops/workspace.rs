//! Journaled mutation scope
//!
//! A `Workspace` borrows the live store mutably and records the original of
//! every leaf before its first change. Committing drops the journal.
//! Dropping an uncommitted workspace replays the journal, so an early `?`
//! return inside a mutation restores the store exactly.

use std::collections::BTreeSet;

use canopy_core_types::LeafId;

use super::store::Store;
use crate::errors::{CanopyError, Result};
use crate::model::Leaf;
use crate::rules::validation::validate_leaves;

/// All-or-nothing mutation scope over a store
pub struct Workspace<'s> {
    store: &'s mut Store,
    journal: Vec<(LeafId, Leaf)>,
    touched: BTreeSet<LeafId>,
    committed: bool,
}

impl<'s> Workspace<'s> {
    /// Open a workspace over the live store
    pub fn open(store: &'s mut Store) -> Self {
        Self {
            store,
            journal: Vec::new(),
            touched: BTreeSet::new(),
            committed: false,
        }
    }

    /// Read view of the store including uncommitted changes
    pub fn store(&self) -> &Store {
        &*self.store
    }

    /// Get a leaf by id, including uncommitted changes
    pub fn get_leaf(&self, id: LeafId) -> Option<&Leaf> {
        self.store.leaves.get(&id)
    }

    /// Ids changed so far, in id order
    pub fn touched(&self) -> impl Iterator<Item = LeafId> + '_ {
        self.touched.iter().copied()
    }

    pub(crate) fn require(&self, id: LeafId) -> Result<&Leaf> {
        self.store.require(id)
    }

    /// Clone of a leaf's current state
    pub(crate) fn snapshot_leaf(&self, id: LeafId) -> Result<Leaf> {
        self.require(id).cloned()
    }

    /// Mutable access to a leaf, journaling it on first touch
    pub(crate) fn leaf_mut(&mut self, id: LeafId) -> Result<&mut Leaf> {
        let leaf = self
            .store
            .leaves
            .get_mut(&id)
            .ok_or(CanopyError::LeafNotFound { leaf_id: id })?;
        if self.touched.insert(id) {
            self.journal.push((id, leaf.clone()));
        }
        Ok(leaf)
    }

    /// Check the structural invariants around every touched leaf
    ///
    /// Covers each touched leaf plus its parent and children both before and
    /// after the change, which is every leaf whose links a step can affect.
    ///
    /// # Errors
    /// Returns `InvariantViolation` for the first violation found.
    pub fn validate(&self) -> Result<()> {
        let mut affected = self.touched.clone();
        let before = self.journal.iter().map(|(_, leaf)| leaf);
        let after = self.touched.iter().filter_map(|id| self.store.leaves.get(id));
        for leaf in before.chain(after) {
            affected.extend(leaf.parent);
            affected.extend(leaf.children.iter().copied());
        }
        validate_leaves(&*self.store, affected)
    }

    /// Keep every change made through this workspace
    pub fn commit(mut self) {
        tracing::debug!(leaf_count = self.touched.len(), "workspace committed");
        self.journal.clear();
        self.committed = true;
    }

    /// Discard every change made through this workspace
    pub fn rollback(self) {}

    fn restore(&mut self) {
        if !self.journal.is_empty() {
            tracing::debug!(leaf_count = self.journal.len(), "workspace rolled back");
        }
        for (id, original) in self.journal.drain(..).rev() {
            self.store.leaves.insert(id, original);
        }
    }
}

impl Drop for Workspace<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.restore();
        }
    }
}

impl Store {
    /// Run `f` inside a workspace and commit only if it succeeds
    ///
    /// The workspace is validated before committing. On any error the store
    /// is restored to its state before the call.
    ///
    /// # Errors
    /// Returns the error from `f`, or `InvariantViolation` if the changes
    /// break a structural invariant.
    pub fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Workspace<'_>) -> Result<T>,
    {
        let mut workspace = Workspace::open(self);
        let value = f(&mut workspace)?;
        workspace.validate()?;
        workspace.commit();
        Ok(value)
    }
}
