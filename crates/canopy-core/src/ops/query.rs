//! Query engine
//!
//! Pure reads over a store. Lookups of unknown ids return empty results
//! rather than errors, except `subtree`, which builds a new store.

use std::collections::{BTreeMap, HashSet};
use std::time::Instant;

use canopy_core_types::LeafId;
use serde_json::Value;

use super::store::Store;
use crate::errors::Result;
use crate::model::{Leaf, Slot};
use crate::seed::ForestSeed;
use crate::{log_op_end, log_op_error, log_op_start};

impl Store {
    /// Get a leaf by id
    pub fn get_leaf(&self, id: LeafId) -> Option<&Leaf> {
        self.leaves.get(&id)
    }

    /// Read one slot of a leaf as an untyped value
    ///
    /// - `Parent`: the parent id, `None` for roots
    /// - `Children`: an array of child ids
    /// - `Data`: the whole data map, or one field when `key` is given
    /// - `Active`: the marker name, `None` when unset
    ///
    /// A `key` with any slot other than `Data` yields `None`.
    pub fn get_field(&self, id: LeafId, slot: Slot, key: Option<&str>) -> Option<Value> {
        let leaf = self.leaves.get(&id)?;
        match (slot, key) {
            (Slot::Data, Some(key)) => leaf.data.get(key).cloned(),
            (Slot::Data, None) => Some(Value::Object(leaf.data.clone())),
            (_, Some(_)) => None,
            (Slot::Parent, None) => leaf.parent.map(|p| Value::from(p.get())),
            (Slot::Children, None) => Some(Value::Array(
                leaf.children.iter().map(|c| Value::from(c.get())).collect(),
            )),
            (Slot::Active, None) => leaf.active.map(|m| Value::from(m.as_str())),
        }
    }

    /// Walk parent links upward from `id`, nearest ancestor first
    ///
    /// Stops at a root or when a leaf repeats, so the walk never takes more
    /// hops than the store has leaves. A parent id that does not resolve is
    /// included and ends the walk.
    fn walk_up(&self, id: LeafId) -> Vec<LeafId> {
        let mut lineage = Vec::new();
        let Some(leaf) = self.leaves.get(&id) else {
            return lineage;
        };

        let mut visited = HashSet::from([id]);
        let mut current = leaf.parent;
        while let Some(parent) = current {
            if !visited.insert(parent) {
                tracing::warn!(
                    leaf_id = id.get(),
                    parent_id = parent.get(),
                    path_len = lineage.len(),
                    "cyclic parent chain, ancestor walk cut off"
                );
                break;
            }
            lineage.push(parent);
            current = self.leaves.get(&parent).and_then(|p| p.parent);
        }
        lineage
    }

    /// Ancestors of a leaf, root first, excluding the leaf itself
    ///
    /// Empty for roots and unknown ids. The path always starts at a root of
    /// a consistent store, however deep the leaf sits.
    pub fn ancestor_path(&self, id: LeafId) -> Vec<LeafId> {
        let mut path = self.walk_up(id);
        path.reverse();
        path
    }

    /// Leaves sharing `id`'s parent, keyed by id
    ///
    /// Roots are siblings of each other. Empty for an unknown id.
    pub fn siblings(&self, id: LeafId, exclude_self: bool) -> BTreeMap<LeafId, &Leaf> {
        let Some(leaf) = self.leaves.get(&id) else {
            return BTreeMap::new();
        };
        self.leaves
            .iter()
            .filter(|(other, candidate)| {
                candidate.parent == leaf.parent && !(exclude_self && **other == id)
            })
            .map(|(other, candidate)| (*other, candidate))
            .collect()
    }

    /// Check if `ancestor` lies on `id`'s parent chain
    pub fn is_descendant_of(&self, id: LeafId, ancestor: LeafId) -> bool {
        self.walk_up(id).contains(&ancestor)
    }

    /// Number of ancestors above a leaf; `None` for unknown ids
    pub fn depth(&self, id: LeafId) -> Option<usize> {
        self.leaves
            .contains_key(&id)
            .then(|| self.walk_up(id).len())
    }

    /// Ids of all root leaves, in id order
    pub fn roots(&self) -> Vec<LeafId> {
        self.leaves
            .values()
            .filter(|leaf| leaf.is_root())
            .map(|leaf| leaf.id)
            .collect()
    }

    /// Children of a leaf, in list order
    pub fn children_of(&self, id: LeafId) -> Vec<&Leaf> {
        self.leaves
            .get(&id)
            .map(|leaf| {
                leaf.children
                    .iter()
                    .filter_map(|child| self.leaves.get(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ids of leaves whose data field `key` equals `value`, in id order
    pub fn find_by_field(&self, key: &str, value: &Value) -> Vec<LeafId> {
        self.leaves
            .values()
            .filter(|leaf| leaf.data.get(key) == Some(value))
            .map(|leaf| leaf.id)
            .collect()
    }

    /// Plant a new store from the descendants of `root`
    ///
    /// With `include_root`, `root` becomes the single root of the new store.
    /// Without it, `root`'s children become the roots. The new store keeps
    /// this store's policy; activation markers are not carried over.
    ///
    /// # Errors
    /// * `LeafNotFound` - If `root` doesn't exist
    pub fn subtree(&self, root: LeafId, include_root: bool) -> Result<Store> {
        log_op_start!("subtree", leaf_id = root.get(), include_root = include_root);
        let start = Instant::now();

        let store = self.subtree_impl(root, include_root).map_err(|e| {
            log_op_error!(
                "subtree",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "subtree",
            duration_ms = start.elapsed().as_millis() as u64,
            leaf_count = store.len()
        );
        Ok(store)
    }

    fn subtree_impl(&self, root: LeafId, include_root: bool) -> Result<Store> {
        let root_leaf = self.require(root)?;

        let mut picked = Vec::new();
        if include_root {
            let mut top = root_leaf.clone();
            top.parent = None;
            picked.push(top);
        }

        let mut visited = HashSet::from([root]);
        let mut pending: Vec<LeafId> = root_leaf.children.iter().rev().copied().collect();
        while let Some(id) = pending.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(leaf) = self.leaves.get(&id) else {
                continue;
            };
            let mut copy = leaf.clone();
            if !include_root && copy.parent == Some(root) {
                copy.parent = None;
            }
            pending.extend(leaf.children.iter().rev().copied());
            picked.push(copy);
        }

        Store::plant_impl(&ForestSeed::new(picked), self.policy.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Activation;
    use crate::seed::SeedRecord;
    use serde_json::json;

    fn menu() -> Store {
        Store::plant(&vec![
            SeedRecord::new(22, None).with_field("name", "Oregon"),
            SeedRecord::new(33, None).with_field("name", "California"),
            SeedRecord::new(44, Some(22)).with_field("name", "Portland"),
            SeedRecord::new(55, Some(22)).with_field("name", "Corvallis"),
            SeedRecord::new(66, Some(55)).with_field("name", "OSU"),
        ])
        .unwrap()
    }

    #[test]
    fn test_get_field_per_slot() {
        let mut store = menu();
        store.leaves.get_mut(&LeafId(66)).unwrap().active = Some(Activation::Current);

        assert_eq!(store.get_field(LeafId(66), Slot::Parent, None), Some(json!(55)));
        assert_eq!(store.get_field(LeafId(22), Slot::Parent, None), None);
        assert_eq!(store.get_field(LeafId(22), Slot::Children, None), Some(json!([44, 55])));
        assert_eq!(
            store.get_field(LeafId(44), Slot::Data, Some("name")),
            Some(json!("Portland"))
        );
        assert_eq!(
            store.get_field(LeafId(44), Slot::Data, None),
            Some(json!({"name": "Portland", "id": 44}))
        );
        assert_eq!(store.get_field(LeafId(66), Slot::Active, None), Some(json!("current")));
        assert_eq!(store.get_field(LeafId(55), Slot::Active, None), None);
        assert_eq!(store.get_field(LeafId(55), Slot::Parent, Some("name")), None);
        assert_eq!(store.get_field(LeafId(999), Slot::Data, None), None);
    }

    #[test]
    fn test_ancestor_path_is_root_first() {
        let store = menu();
        assert_eq!(store.ancestor_path(LeafId(66)), vec![LeafId(22), LeafId(55)]);
        assert!(store.ancestor_path(LeafId(22)).is_empty());
        assert!(store.ancestor_path(LeafId(999)).is_empty());
    }

    #[test]
    fn test_ancestor_path_survives_corrupted_cycle() {
        let mut store = menu();
        store.leaves.get_mut(&LeafId(22)).unwrap().parent = Some(LeafId(66));

        let path = store.ancestor_path(LeafId(66));
        assert_eq!(path, vec![LeafId(22), LeafId(55)]);
    }

    #[test]
    fn test_ancestor_path_reaches_root_of_deep_chain() {
        let seed: Vec<SeedRecord> = (1..=200i64)
            .map(|n| SeedRecord::new(n, (n > 1).then(|| n - 1)))
            .collect();
        let store = Store::plant(&seed).unwrap();

        let path = store.ancestor_path(LeafId(200));
        assert_eq!(path.len(), 199);
        assert_eq!(path.first(), Some(&LeafId(1)));
        assert_eq!(path.last(), Some(&LeafId(199)));
        assert_eq!(store.depth(LeafId(200)), Some(199));
    }

    #[test]
    fn test_siblings_share_parent() {
        let store = menu();

        let with_self: Vec<_> = store.siblings(LeafId(44), false).into_keys().collect();
        assert_eq!(with_self, vec![LeafId(44), LeafId(55)]);

        let without_self: Vec<_> = store.siblings(LeafId(44), true).into_keys().collect();
        assert_eq!(without_self, vec![LeafId(55)]);

        let roots: Vec<_> = store.siblings(LeafId(22), true).into_keys().collect();
        assert_eq!(roots, vec![LeafId(33)]);

        assert!(store.siblings(LeafId(999), false).is_empty());
    }

    #[test]
    fn test_lineage_helpers() {
        let store = menu();
        assert!(store.is_descendant_of(LeafId(66), LeafId(22)));
        assert!(!store.is_descendant_of(LeafId(22), LeafId(66)));
        assert!(!store.is_descendant_of(LeafId(66), LeafId(66)));
        assert_eq!(store.depth(LeafId(66)), Some(2));
        assert_eq!(store.depth(LeafId(33)), Some(0));
        assert_eq!(store.depth(LeafId(999)), None);
        assert_eq!(store.roots(), vec![LeafId(22), LeafId(33)]);

        let names: Vec<_> = store
            .children_of(LeafId(22))
            .iter()
            .map(|leaf| leaf.data["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("Portland"), json!("Corvallis")]);
        assert!(store.children_of(LeafId(999)).is_empty());
    }

    #[test]
    fn test_find_by_field() {
        let store = menu();
        assert_eq!(store.find_by_field("name", &json!("OSU")), vec![LeafId(66)]);
        assert!(store.find_by_field("name", &json!("Iowa")).is_empty());
    }
}
