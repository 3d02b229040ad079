//! Leaf identifiers
//!
//! Leaves reference one another only by id, never by handle. Ids are
//! assigned by the seed adapter and never generated internally.

use serde::{Deserialize, Serialize};

/// Identifier of a single leaf in a Canopy store
///
/// Serializes transparently as its integer value so that seeds and
/// snapshots read naturally (`{"id": 22, "parent": null}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeafId(pub u64);

impl LeafId {
    /// Get the raw integer value
    pub fn get(self) -> u64 {
        self.0
    }

    /// Build a LeafId from a signed seed value
    ///
    /// Returns `None` for zero and negative values: ids are positive.
    pub fn from_seed(raw: i64) -> Option<Self> {
        u64::try_from(raw).ok().filter(|v| *v > 0).map(Self)
    }
}

impl From<u64> for LeafId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for LeafId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
