//! Activation marking
//!
//! Marks the leaf matching the caller's current context and its ancestors,
//! so a renderer can highlight the active trail.

use std::collections::BTreeMap;
use std::time::Instant;

use canopy_core_types::LeafId;
use serde_json::Value;

use super::store::Store;
use crate::errors::Result;
use crate::model::Activation;
use crate::{log_op_end, log_op_error, log_op_start};

impl Store {
    /// Mark a leaf `current`, its parent `parent`, and every further
    /// ancestor `ancestor`
    ///
    /// Each mark is committed on its own. Returns the marked ids, starting
    /// with `id` and walking up.
    ///
    /// # Errors
    /// * `LeafNotFound` - If `id` doesn't exist
    pub fn activate(&mut self, id: LeafId) -> Result<Vec<LeafId>> {
        log_op_start!("activate", leaf_id = id.get());
        let start = Instant::now();

        let marked = self.activate_impl(id).map_err(|e| {
            log_op_error!(
                "activate",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                leaf_id = id.get()
            );
            e
        })?;

        log_op_end!(
            "activate",
            duration_ms = start.elapsed().as_millis() as u64,
            path_len = marked.len()
        );
        Ok(marked)
    }

    fn activate_impl(&mut self, id: LeafId) -> Result<Vec<LeafId>> {
        self.require(id)?;

        let mut trail = vec![id];
        trail.extend(self.ancestor_path(id).into_iter().rev());

        for (distance, leaf) in trail.iter().enumerate() {
            let marker = Activation::for_distance(distance);
            self.transaction(|ws| ws.set_active(*leaf, Some(marker)))?;
        }
        Ok(trail)
    }

    /// Unset every activation marker in one transaction
    ///
    /// Returns how many leaves were marked.
    ///
    /// # Errors
    /// Returns `InvariantViolation` only if the store was already corrupt.
    pub fn clear_activation(&mut self) -> Result<usize> {
        let marked: Vec<LeafId> = self
            .leaves
            .values()
            .filter(|leaf| leaf.active.is_some())
            .map(|leaf| leaf.id)
            .collect();

        self.transaction(|ws| {
            for id in &marked {
                ws.set_active(*id, None)?;
            }
            Ok(marked.len())
        })
    }

    /// Check if any leaf carries a marker
    pub fn is_activated(&self) -> bool {
        self.leaves.values().any(|leaf| leaf.active.is_some())
    }

    /// Activate every leaf whose data field `key` equals `value`
    ///
    /// Existing markers are cleared first. Where the trails of several
    /// matches overlap, the stronger marker wins (`current` over `parent`
    /// over `ancestor`). Returns the matched ids.
    ///
    /// # Errors
    /// Returns `InvariantViolation` only if the store was already corrupt.
    pub fn activate_where(&mut self, key: &str, value: &Value) -> Result<Vec<LeafId>> {
        log_op_start!("activate_where", key = key);
        let start = Instant::now();

        let matched = self.activate_where_impl(key, value).map_err(|e| {
            log_op_error!(
                "activate_where",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "activate_where",
            duration_ms = start.elapsed().as_millis() as u64,
            leaf_count = matched.len()
        );
        Ok(matched)
    }

    fn activate_where_impl(&mut self, key: &str, value: &Value) -> Result<Vec<LeafId>> {
        let matched = self.find_by_field(key, value);
        self.clear_activation()?;

        let mut markers: BTreeMap<LeafId, Activation> = BTreeMap::new();
        for id in &matched {
            let trail = std::iter::once(*id).chain(self.ancestor_path(*id).into_iter().rev());
            for (distance, leaf) in trail.enumerate() {
                let marker = Activation::for_distance(distance);
                markers
                    .entry(leaf)
                    .and_modify(|current| *current = (*current).max(marker))
                    .or_insert(marker);
            }
        }

        for (leaf, marker) in markers {
            self.transaction(|ws| ws.set_active(leaf, Some(marker)))?;
        }
        Ok(matched)
    }
}
