//! Canopy Core - hierarchical leaf store with transactional mutation
//!
//! This crate provides:
//! - The leaf model and seed adapters that normalize flat input records
//! - Two-pass planting of a `Store` from a seed
//! - A query engine (ancestor paths, siblings, subtrees, field lookups)
//! - An all-or-nothing mutation engine built on a journaled `Workspace`
//! - Cascading reparent and children replacement that never create cycles
//! - Current/parent/ancestor activation marking
//! - Structural invariant rules and a thread-shareable `SharedStore`
//!
//! # Example
//!
//! ```
//! use canopy_core::{LeafId, SeedRecord, Step, Store};
//!
//! let mut store = Store::plant(&vec![
//!     SeedRecord::new(22, None).with_field("name", "Oregon"),
//!     SeedRecord::new(55, Some(22)).with_field("name", "Corvallis"),
//!     SeedRecord::new(77, None).with_field("name", "Iowa"),
//! ])
//! .unwrap();
//!
//! store.set_field(LeafId(55), Step::parent(77u64)).unwrap();
//! assert_eq!(store.ancestor_path(LeafId(55)), vec![LeafId(77)]);
//! ```

pub use canopy_core_types;
pub use canopy_core_types::LeafId;

pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod ops;
pub mod policy;
pub mod rules;
pub mod seed;
pub mod shared;
pub mod snapshot;

// Re-export commonly used types
pub use errors::{CanopyError, ExError, ExErrorKind, Result};
pub use model::{Activation, Leaf, LeafData, Slot, Step};
pub use ops::{Store, Workspace};
pub use policy::{CyclePolicy, OrphanPolicy, TreePolicy};
pub use seed::{ForestSeed, RecordSeed, SeedAdapter, SeedRecord};
pub use shared::SharedStore;
