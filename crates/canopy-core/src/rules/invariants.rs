use std::collections::HashSet;

use canopy_core_types::LeafId;

use crate::model::leaf::ID_KEY;
use crate::ops::Store;

/// One broken structural invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// `leaf.parent` names a leaf that does not exist
    DanglingParent { leaf: LeafId, parent: LeafId },
    /// The parent exists but does not list the leaf among its children
    UnlistedChild { leaf: LeafId, parent: LeafId },
    /// A children list names a leaf that does not exist
    DanglingChild { leaf: LeafId, child: LeafId },
    /// A listed child names some other parent
    MismatchedChild { leaf: LeafId, child: LeafId },
    /// A child id appears more than once in one children list
    DuplicateChild { leaf: LeafId, child: LeafId },
    /// The map key, `leaf.id` and `data["id"]` disagree
    IdMismatch { leaf: LeafId },
    /// The parent chain starting at this leaf revisits a leaf
    Cycle { leaf: LeafId },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::DanglingParent { leaf, parent } => {
                write!(f, "leaf {} names missing parent {}", leaf, parent)
            }
            Violation::UnlistedChild { leaf, parent } => {
                write!(f, "leaf {} is not listed by its parent {}", leaf, parent)
            }
            Violation::DanglingChild { leaf, child } => {
                write!(f, "leaf {} lists missing child {}", leaf, child)
            }
            Violation::MismatchedChild { leaf, child } => {
                write!(f, "leaf {} lists child {} which names another parent", leaf, child)
            }
            Violation::DuplicateChild { leaf, child } => {
                write!(f, "leaf {} lists child {} more than once", leaf, child)
            }
            Violation::IdMismatch { leaf } => write!(f, "leaf {} has an inconsistent id", leaf),
            Violation::Cycle { leaf } => write!(f, "parent chain of leaf {} is cyclic", leaf),
        }
    }
}

/// Check if the parent chain starting at a leaf revisits a leaf
///
/// The walk stops at a root or at a parent that does not exist.
pub fn has_cycle(store: &Store, leaf_id: LeafId) -> bool {
    let mut visited = HashSet::new();
    let mut current = Some(leaf_id);

    while let Some(id) = current {
        if !visited.insert(id) {
            return true;
        }
        current = store.leaves.get(&id).and_then(|leaf| leaf.parent);
    }

    false
}

/// Find every violation that involves one leaf
///
/// Returns an empty list for ids that are not in the store.
pub fn leaf_violations(store: &Store, leaf_id: LeafId) -> Vec<Violation> {
    let mut violations = Vec::new();
    let Some(leaf) = store.leaves.get(&leaf_id) else {
        return violations;
    };

    let data_id = leaf.data.get(ID_KEY).and_then(serde_json::Value::as_u64);
    if leaf.id != leaf_id || data_id != Some(leaf_id.get()) {
        violations.push(Violation::IdMismatch { leaf: leaf_id });
    }

    if let Some(parent) = leaf.parent {
        match store.leaves.get(&parent) {
            None => violations.push(Violation::DanglingParent {
                leaf: leaf_id,
                parent,
            }),
            Some(p) if !p.children.contains(&leaf_id) => {
                violations.push(Violation::UnlistedChild {
                    leaf: leaf_id,
                    parent,
                })
            }
            Some(_) => {}
        }
    }

    let mut seen = HashSet::new();
    for &child in &leaf.children {
        if !seen.insert(child) {
            violations.push(Violation::DuplicateChild {
                leaf: leaf_id,
                child,
            });
            continue;
        }
        match store.leaves.get(&child) {
            None => violations.push(Violation::DanglingChild {
                leaf: leaf_id,
                child,
            }),
            Some(c) if c.parent != Some(leaf_id) => {
                violations.push(Violation::MismatchedChild {
                    leaf: leaf_id,
                    child,
                })
            }
            Some(_) => {}
        }
    }

    if has_cycle(store, leaf_id) {
        violations.push(Violation::Cycle { leaf: leaf_id });
    }

    violations
}

/// Find every violation in the store, in id order
pub fn find_violations(store: &Store) -> Vec<Violation> {
    store
        .leaves
        .keys()
        .flat_map(|id| leaf_violations(store, *id))
        .collect()
}
