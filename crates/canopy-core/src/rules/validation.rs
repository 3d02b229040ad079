use canopy_core_types::LeafId;

use crate::errors::{CanopyError, Result};
use crate::ops::Store;

use super::invariants;

/// Validate the whole store
///
/// Checks, for every leaf:
///
/// 1. A named parent exists and lists the leaf
/// 2. Every listed child exists and names the leaf as parent
/// 3. The parent chain is acyclic
/// 4. `data["id"]` mirrors the leaf id
/// 5. No child is listed twice
///
/// # Errors
/// Returns `InvariantViolation` for the first violation found. For
/// exhaustive reporting call `invariants::find_violations` directly.
pub fn validate_store(store: &Store) -> Result<()> {
    match invariants::find_violations(store).into_iter().next() {
        Some(violation) => Err(CanopyError::InvariantViolation {
            reason: violation.to_string(),
        }),
        None => Ok(()),
    }
}

/// Validate only the given leaves
///
/// Used after a mutation, where only leaves the workspace touched (and their
/// old and new neighbours) can have changed. Unknown ids are skipped.
///
/// # Errors
/// Returns `InvariantViolation` for the first violation found.
pub fn validate_leaves<I>(store: &Store, ids: I) -> Result<()>
where
    I: IntoIterator<Item = LeafId>,
{
    for id in ids {
        if let Some(violation) = invariants::leaf_violations(store, id).into_iter().next() {
            return Err(CanopyError::InvariantViolation {
                reason: violation.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Leaf, LeafData};

    #[test]
    fn test_first_violation_is_reported() {
        let mut orphan = Leaf::new(LeafId(44), LeafData::new());
        orphan.parent = Some(LeafId(22));
        let store = Store::from_leaves([(orphan.id, orphan)].into_iter().collect());

        let err = validate_store(&store).unwrap_err();
        assert!(
            matches!(err, CanopyError::InvariantViolation { ref reason } if reason.contains("missing parent 22"))
        );
    }

    #[test]
    fn test_subset_validation_skips_unknown_ids() {
        let store = Store::new();
        assert!(validate_leaves(&store, [LeafId(1), LeafId(2)]).is_ok());
        assert!(validate_store(&store).is_ok());
    }
}
