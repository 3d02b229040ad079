//! Mutation engine
//!
//! Field-set steps run on a `Workspace`; the public `Store` entry points
//! wrap them in a transaction so every call is all-or-nothing. Nested
//! work (the reparent cascade inside a children replacement, the steps of a
//! batch) shares the caller's workspace.

use std::collections::HashSet;
use std::time::Instant;

use canopy_core_types::LeafId;
use serde_json::Value;

use super::store::Store;
use super::workspace::Workspace;
use crate::errors::{CanopyError, Result};
use crate::model::leaf::ID_KEY;
use crate::model::{Activation, Leaf, Slot, Step};
use crate::policy::CyclePolicy;
use crate::{log_op_end, log_op_error, log_op_start};

fn aborted(leaf_id: LeafId, step: usize, source: CanopyError) -> CanopyError {
    CanopyError::MutationAborted {
        leaf_id,
        step,
        source: Box::new(source),
    }
}

impl Workspace<'_> {
    /// Apply one step to a leaf
    ///
    /// # Errors
    /// Returns the step's own error; the caller decides whether to wrap it.
    pub fn apply_step(&mut self, id: LeafId, step: Step) -> Result<()> {
        match step {
            Step::Parent(Some(parent)) => self.reparent(id, parent),
            Step::Parent(None) => self.detach(id),
            Step::Children(children) => self.replace_children(id, children),
            Step::Data { key, value } => self.set_data(id, key, value),
            Step::Active(marker) => self.set_active(id, marker),
        }
    }

    /// Move `child` under `new_parent`
    ///
    /// If `new_parent` currently lies below `child`, the store's
    /// `CyclePolicy` decides: `Detach` first turns `new_parent` into a root,
    /// `Reject` refuses the move. Moving a leaf to its current parent is a
    /// no-op.
    ///
    /// # Errors
    /// * `LeafNotFound` - If either leaf doesn't exist
    /// * `CycleRejected` - If `child == new_parent`, or the move would close
    ///   a cycle under `CyclePolicy::Reject`
    pub fn reparent(&mut self, child: LeafId, new_parent: LeafId) -> Result<()> {
        let current = self.require(child)?.parent;
        self.require(new_parent)?;

        if child == new_parent {
            return Err(CanopyError::CycleRejected {
                leaf_id: child,
                new_parent,
            });
        }
        if current == Some(new_parent) {
            return Ok(());
        }

        if self.store().is_descendant_of(new_parent, child) {
            let cycles = self.store().policy.cycles;
            match cycles {
                CyclePolicy::Detach => {
                    tracing::debug!(
                        leaf_id = child.get(),
                        parent_id = new_parent.get(),
                        "detaching descendant before reparent"
                    );
                    self.detach(new_parent)?;
                }
                CyclePolicy::Reject => {
                    return Err(CanopyError::CycleRejected {
                        leaf_id: child,
                        new_parent,
                    })
                }
            }
        }

        self.detach(child)?;
        self.leaf_mut(child)?.parent = Some(new_parent);
        self.leaf_mut(new_parent)?.add_child(child);
        Ok(())
    }

    /// Turn a leaf into a root, removing it from its parent's children
    ///
    /// # Errors
    /// * `LeafNotFound` - If the leaf doesn't exist
    pub fn detach(&mut self, id: LeafId) -> Result<()> {
        let Some(parent) = self.require(id)?.parent else {
            return Ok(());
        };
        if self.get_leaf(parent).is_some() {
            self.leaf_mut(parent)?.remove_child(id);
        }
        self.leaf_mut(id)?.parent = None;
        Ok(())
    }

    /// Replace a leaf's children with exactly `children`, in that order
    ///
    /// Current children missing from the list become roots. Listed leaves
    /// are reparented through the cascade, taking their own subtrees along.
    ///
    /// # Errors
    /// * `InvalidSlot` - If the list repeats an id
    /// * `LeafNotFound` - If the leaf or any listed id doesn't exist
    /// * `MutationAborted` - If reparenting a listed leaf fails; `step` is
    ///   its position in the list
    pub fn replace_children(&mut self, id: LeafId, children: Vec<LeafId>) -> Result<()> {
        let mut seen = HashSet::with_capacity(children.len());
        if let Some(dup) = children.iter().find(|child| !seen.insert(**child)) {
            return Err(CanopyError::invalid_slot(
                Slot::Children.as_str(),
                format!("child {} listed more than once", dup),
            ));
        }

        let current = self.require(id)?.children.clone();
        for child in &children {
            self.require(*child)?;
        }

        for dropped in current.iter().filter(|c| !children.contains(*c)) {
            self.detach(*dropped)?;
        }
        for (position, child) in children.iter().enumerate() {
            self.reparent(*child, id)
                .map_err(|e| aborted(id, position, e))?;
        }

        self.leaf_mut(id)?.children = children;
        Ok(())
    }

    /// Set one data field
    ///
    /// # Errors
    /// * `IdImmutable` - If `key` is the reserved `id` key
    /// * `LeafNotFound` - If the leaf doesn't exist
    pub fn set_data(&mut self, id: LeafId, key: String, value: Value) -> Result<()> {
        let leaf = self.leaf_mut(id)?;
        if key == ID_KEY {
            return Err(CanopyError::IdImmutable { leaf_id: id });
        }
        leaf.data.insert(key, value);
        Ok(())
    }

    /// Overwrite the activation marker
    ///
    /// # Errors
    /// * `LeafNotFound` - If the leaf doesn't exist
    pub fn set_active(&mut self, id: LeafId, marker: Option<Activation>) -> Result<()> {
        self.leaf_mut(id)?.active = marker;
        Ok(())
    }
}

impl Store {
    /// Apply one step to a leaf as its own transaction
    ///
    /// Returns the leaf as it stands after the step.
    ///
    /// # Errors
    /// Returns the step's error (`LeafNotFound`, `IdImmutable`,
    /// `CycleRejected`, `InvalidSlot`, `MutationAborted`) or
    /// `InvariantViolation`. The store is unchanged on any error.
    pub fn set_field(&mut self, id: LeafId, step: Step) -> Result<Leaf> {
        log_op_start!("set_field", leaf_id = id.get(), slot = step.slot().as_str());
        let start = Instant::now();

        let leaf = self
            .transaction(|ws| {
                ws.apply_step(id, step)?;
                ws.snapshot_leaf(id)
            })
            .map_err(|e| {
                log_op_error!(
                    "set_field",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    leaf_id = id.get()
                );
                e
            })?;

        log_op_end!(
            "set_field",
            duration_ms = start.elapsed().as_millis() as u64,
            leaf_id = id.get()
        );
        Ok(leaf)
    }

    /// Apply a batch of steps to one leaf as a single transaction
    ///
    /// Steps run in order. Either all of them take effect or none do.
    ///
    /// # Errors
    /// * `MutationAborted` - If a step fails (`step` is its index) or the
    ///   batch is empty
    /// * `InvariantViolation` - If the combined result breaks an invariant
    pub fn set_many(&mut self, id: LeafId, steps: Vec<Step>) -> Result<Leaf> {
        log_op_start!("set_many", leaf_id = id.get(), step_count = steps.len());
        let start = Instant::now();

        let leaf = self.set_many_impl(id, steps).map_err(|e| {
            log_op_error!(
                "set_many",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                leaf_id = id.get()
            );
            e
        })?;

        log_op_end!(
            "set_many",
            duration_ms = start.elapsed().as_millis() as u64,
            leaf_id = id.get()
        );
        Ok(leaf)
    }

    fn set_many_impl(&mut self, id: LeafId, steps: Vec<Step>) -> Result<Leaf> {
        if steps.is_empty() {
            return Err(aborted(
                id,
                0,
                CanopyError::invalid_slot("steps", "batch has no steps"),
            ));
        }

        self.transaction(|ws| {
            for (index, step) in steps.into_iter().enumerate() {
                ws.apply_step(id, step).map_err(|e| aborted(id, index, e))?;
            }
            ws.snapshot_leaf(id)
        })
    }
}
