use super::{SeedAdapter, SeedRecord};
use crate::errors::{CanopyError, Result};
use crate::model::Leaf;

/// Adapter over leaves taken from an existing tree
///
/// Only `id`, `parent` and `data` are carried over; children lists are
/// rebuilt by planting and activation markers are dropped.
#[derive(Debug, Clone, Default)]
pub struct ForestSeed {
    leaves: Vec<Leaf>,
}

impl ForestSeed {
    pub fn new(leaves: Vec<Leaf>) -> Self {
        Self { leaves }
    }
}

fn signed(id: u64) -> Result<i64> {
    i64::try_from(id).map_err(|_| CanopyError::invalid_seed(format!("leaf id {} out of range", id)))
}

impl SeedAdapter for ForestSeed {
    fn normalize(&self) -> Result<Vec<SeedRecord>> {
        self.leaves
            .iter()
            .map(|leaf| {
                Ok(SeedRecord {
                    id: signed(leaf.id.get())?,
                    parent: leaf.parent.map(|p| signed(p.get())).transpose()?,
                    data: leaf.data.clone(),
                })
            })
            .collect()
    }
}
