//! Two-pass planting of normalized seed records

use std::collections::{BTreeMap, HashSet};

use canopy_core_types::LeafId;

use crate::errors::{CanopyError, Result};
use crate::model::leaf::ID_KEY;
use crate::model::Leaf;
use crate::policy::{OrphanPolicy, TreePolicy};
use crate::seed::SeedRecord;

/// Build leaves from seed records
///
/// Pass one validates every record and creates a root leaf for it. Pass two
/// links each record to its declared parent in seed order, so children lists
/// follow the order records appeared in. A parent of `0` means "no parent".
///
/// The result is not yet checked for cycles; the caller validates it.
///
/// # Errors
/// * `InvalidSeed` - Non-positive or duplicate id, mismatched `data["id"]`,
///   self-parent, negative parent, or an orphan under `OrphanPolicy::Reject`
pub(crate) fn plant_records(
    records: Vec<SeedRecord>,
    policy: &TreePolicy,
) -> Result<BTreeMap<LeafId, Leaf>> {
    let mut leaves = BTreeMap::new();
    let mut links = Vec::with_capacity(records.len());
    let mut seen = HashSet::with_capacity(records.len());

    for record in records {
        let id = LeafId::from_seed(record.id).ok_or_else(|| {
            CanopyError::invalid_seed(format!("leaf id {} is not positive", record.id))
        })?;
        if !seen.insert(id) {
            return Err(CanopyError::invalid_seed(format!("duplicate leaf id {}", id)));
        }
        if let Some(declared) = record.data.get(ID_KEY) {
            if declared.as_i64() != Some(record.id) {
                return Err(CanopyError::invalid_seed(format!(
                    "record {} carries data id {}",
                    id, declared
                )));
            }
        }

        let parent = match record.parent {
            None | Some(0) => None,
            Some(raw) if raw == record.id => {
                return Err(CanopyError::invalid_seed(format!(
                    "leaf {} names itself as parent",
                    id
                )))
            }
            Some(raw) => Some(LeafId::from_seed(raw).ok_or_else(|| {
                CanopyError::invalid_seed(format!("leaf {} has negative parent {}", id, raw))
            })?),
        };

        leaves.insert(id, Leaf::new(id, record.data));
        links.push((id, parent));
    }

    for (id, parent) in links {
        let Some(parent) = parent else {
            continue;
        };
        match leaves.get_mut(&parent) {
            Some(parent_leaf) => parent_leaf.add_child(id),
            None => match policy.orphans {
                OrphanPolicy::PromoteToRoot => {
                    tracing::debug!(
                        leaf_id = id.get(),
                        parent_id = parent.get(),
                        "orphan promoted to root"
                    );
                    continue;
                }
                OrphanPolicy::Reject => {
                    return Err(CanopyError::invalid_seed(format!(
                        "leaf {} names missing parent {}",
                        id, parent
                    )))
                }
            },
        }
        if let Some(leaf) = leaves.get_mut(&id) {
            leaf.parent = Some(parent);
        }
    }

    Ok(leaves)
}
