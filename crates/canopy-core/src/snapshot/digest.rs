//! Digest computation for store snapshots.
//!
//! ## Determinism Guarantees
//!
//! - Leaves are serialized in id order (the store is a `BTreeMap`)
//! - Data maps serialize with sorted keys
//! - Different children order produces a different digest

use crate::errors::Result;
use crate::model::Leaf;
use crate::ops::Store;
use sha2::{Digest, Sha256};

/// Compute the digest of a store's leaves.
///
/// ## Returns
///
/// Hex-encoded SHA256 digest (64 characters)
///
/// ## Errors
///
/// Returns `CanopyError::Serialization` if JSON serialization fails.
///
/// ## Example
///
/// ```
/// use canopy_core::snapshot::compute_store_digest;
/// use canopy_core::{SeedRecord, Store};
///
/// let store = Store::plant(&vec![SeedRecord::new(22, None)]).unwrap();
/// let digest = compute_store_digest(&store).unwrap();
/// assert_eq!(digest.len(), 64);
/// ```
pub fn compute_store_digest(store: &Store) -> Result<String> {
    let leaves: Vec<&Leaf> = store.grow().values().collect();
    let canonical = serde_json::to_string(&leaves)?;
    Ok(hash_string(&canonical))
}

/// Hash a string using SHA256.
fn hash_string(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
