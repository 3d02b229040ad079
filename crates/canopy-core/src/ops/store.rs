use std::collections::BTreeMap;
use std::time::Instant;

use canopy_core_types::LeafId;
use serde_json::Value;

use super::plant::plant_records;
use crate::errors::{CanopyError, Result};
use crate::model::Leaf;
use crate::policy::TreePolicy;
use crate::rules::validation::validate_store;
use crate::seed::{self, SeedAdapter};
use crate::snapshot::compute_store_digest;
use crate::{log_op_end, log_op_error, log_op_start};

/// In-memory hierarchical store of leaves
///
/// Leaves are keyed by id in a `BTreeMap`, so every listing (roots,
/// siblings, snapshots) iterates in id order. Not thread-safe on its own;
/// wrap it in a `SharedStore` to share it between threads.
///
/// The store is only ever built by planting a seed. Leaves are never added
/// or removed afterwards; replanting replaces the whole store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    /// Map of leaf id to leaf
    pub(crate) leaves: BTreeMap<LeafId, Leaf>,
    /// Policy the store was planted with
    pub(crate) policy: TreePolicy,
}

impl Store {
    /// Create a new empty store with the default policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty store with the given policy
    ///
    /// Useful as the target of [`Store::replant`].
    pub fn with_policy(policy: TreePolicy) -> Self {
        Self {
            leaves: BTreeMap::new(),
            policy,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_leaves(leaves: BTreeMap<LeafId, Leaf>) -> Self {
        Self {
            leaves,
            policy: TreePolicy::default(),
        }
    }

    /// Policy this store was planted with
    pub fn policy(&self) -> &TreePolicy {
        &self.policy
    }

    /// Plant a store from a seed adapter with the default policy
    ///
    /// # Errors
    /// * `InvalidSeed` - If the seed is malformed or its parent links form a cycle
    pub fn plant<A: SeedAdapter + ?Sized>(adapter: &A) -> Result<Self> {
        Self::plant_with_policy(adapter, TreePolicy::default())
    }

    /// Plant a store from a seed adapter
    ///
    /// # Errors
    /// * `InvalidSeed` - If the seed is malformed or its parent links form a cycle
    pub fn plant_with_policy<A: SeedAdapter + ?Sized>(
        adapter: &A,
        policy: TreePolicy,
    ) -> Result<Self> {
        log_op_start!("plant");
        let start = Instant::now();

        let store = Self::plant_impl(adapter, policy).map_err(|e| {
            log_op_error!(
                "plant",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "plant",
            duration_ms = start.elapsed().as_millis() as u64,
            leaf_count = store.len()
        );
        Ok(store)
    }

    /// Plant a store from an untyped seed document
    ///
    /// See [`seed::from_document`] for the accepted shapes.
    ///
    /// # Errors
    /// * `NotASeedAdapter` - If the document names no known adapter
    /// * `InvalidSeed` - If the seed is malformed
    pub fn plant_document(doc: &Value) -> Result<Self> {
        let adapter = seed::from_document(doc)?;
        Self::plant(&adapter)
    }

    /// Replace the whole store with a freshly planted seed
    ///
    /// Keeps the current policy. On failure the store is left untouched.
    ///
    /// # Errors
    /// * `InvalidSeed` - If the seed is malformed
    pub fn replant<A: SeedAdapter + ?Sized>(&mut self, adapter: &A) -> Result<()> {
        log_op_start!("replant", leaf_count = self.len());
        let start = Instant::now();

        let planted = Self::plant_impl(adapter, self.policy.clone()).map_err(|e| {
            log_op_error!(
                "replant",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;
        *self = planted;

        log_op_end!(
            "replant",
            duration_ms = start.elapsed().as_millis() as u64,
            leaf_count = self.len()
        );
        Ok(())
    }

    pub(crate) fn plant_impl<A: SeedAdapter + ?Sized>(
        adapter: &A,
        policy: TreePolicy,
    ) -> Result<Self> {
        let records = adapter.normalize()?;
        let leaves = plant_records(records, &policy)?;
        let store = Self { leaves, policy };
        validate_store(&store).map_err(|e| CanopyError::invalid_seed(e.to_string()))?;
        Ok(store)
    }

    /// Full snapshot of every leaf, keyed by id
    pub fn grow(&self) -> &BTreeMap<LeafId, Leaf> {
        &self.leaves
    }

    /// Number of leaves
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Check if the store holds no leaves
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// SHA256 digest of the store's full state
    ///
    /// # Errors
    /// Returns `Serialization` if a leaf cannot be encoded.
    pub fn digest(&self) -> Result<String> {
        compute_store_digest(self)
    }

    /// Get a leaf that must exist
    pub(crate) fn require(&self, id: LeafId) -> Result<&Leaf> {
        self.leaves
            .get(&id)
            .ok_or(CanopyError::LeafNotFound { leaf_id: id })
    }
}
