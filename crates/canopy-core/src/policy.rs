//! Tree policy configuration
//!
//! `TreePolicy` decides the two behaviors the store treats as deliberate
//! choices rather than discovered rules: what planting does with orphaned
//! seed records, and what a reparent does when the new parent is currently
//! a descendant of the moved leaf.
//!
//! # Example
//!
//! ```toml
//! orphans = "promote-to-root"
//! cycles = "reject"
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CanopyError, Result};

/// Handling of seed records whose parent is not part of the seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrphanPolicy {
    /// Clear the dangling parent; the record becomes a root
    #[default]
    PromoteToRoot,
    /// Fail planting with `InvalidSeed`
    Reject,
}

/// Handling of a reparent whose target lies below the moved leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CyclePolicy {
    /// Detach the target from its current parent first, then move
    #[default]
    Detach,
    /// Fail the reparent with `CycleRejected`
    Reject,
}

/// Store-wide policy, fixed at planting time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreePolicy {
    /// Orphan handling during planting
    pub orphans: OrphanPolicy,

    /// Cycle handling during reparent
    pub cycles: CyclePolicy,
}

impl TreePolicy {
    /// Parse a policy from TOML text
    ///
    /// # Errors
    ///
    /// Returns `InvalidPolicy` if the text is not valid TOML, names an
    /// unknown key, or names an unknown policy value.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| CanopyError::InvalidPolicy {
            reason: e.to_string(),
        })
    }
}
